use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use desk_core::{config, PresetStore};
use shared::{
    domain::{PresetIndex, SlotDisplay},
    error::PersistenceError,
    persistence::PresetPersistence,
};
use storage::JsonPresetFile;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = storage::DEFAULT_PRESET_PATH)]
    presets: String,
    #[arg(long, default_value_t = config::DEFAULT_CHANNEL_COUNT)]
    channels: usize,
    #[arg(long, default_value_t = config::DEFAULT_PRESET_DIGITS)]
    digits: u32,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Show { index: u32 },
    Clear { index: u32 },
    Rename { index: u32, name: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let file = JsonPresetFile::new(&cli.presets);
    for line in run(&cli, &file)? {
        println!("{line}");
    }
    Ok(())
}

fn run(cli: &Cli, file: &JsonPresetFile) -> Result<Vec<String>> {
    let persisted = match file.load_all() {
        Ok(persisted) => persisted,
        Err(PersistenceError::Missing { .. }) => Default::default(),
        Err(error) => return Err(error).context("cannot read preset file"),
    };
    let mut store = PresetStore::from_persisted(&persisted, cli.channels, cli.digits);

    let output = match &cli.command {
        Command::List => (0..store.len() as u32)
            .map(PresetIndex)
            .map(|index| {
                let state = match store.display(index) {
                    SlotDisplay::Empty => "empty",
                    SlotDisplay::Populated => "populated",
                };
                format!("{:>5}  {state:<9}  {}", index.0, store.load(index).name)
            })
            .collect(),
        Command::Show { index } => {
            let slot = store.load(PresetIndex(*index));
            let levels: Vec<String> = slot.levels.iter().map(u8::to_string).collect();
            vec![
                format!("preset {index} '{}'", slot.name),
                levels.join(" "),
            ]
        }
        Command::Clear { index } => {
            store.clear(PresetIndex(*index));
            file.save_all(&store.to_persisted())?;
            vec![format!("cleared preset {index}")]
        }
        Command::Rename { index, name } => {
            let index = PresetIndex(*index);
            let Some(slot) = store.slot(index).cloned() else {
                bail!("preset {index} does not exist");
            };
            store.save(index, &slot.levels, name.clone())?;
            file.save_all(&store.to_persisted())?;
            vec![format!("renamed preset {index} to '{name}'")]
        }
    };
    Ok(output)
}
