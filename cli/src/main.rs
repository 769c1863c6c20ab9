use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use coterie_engine::api::{decode_text, load_character};
use coterie_engine::content::{standard_discipline, standard_disciplines};
use coterie_engine::{
    begin_edit, diff, transfer, Character, CharacterId, Discipline, JsonFileStore, Kind, Roster,
};
use std::{fs, path::PathBuf};
use tracing::Level;

#[derive(Copy, Clone, ValueEnum)]
enum KindArg {
    Vampire,
    Ghoul,
    Mage,
}

#[derive(Subcommand)]
enum Cmd {
    /// Create a character and add it to the roster
    New {
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        name: String,
    },
    /// List characters (index, id, type, name)
    List {
        /// Show archived characters instead of active ones
        #[arg(long, default_value_t = false)]
        archived: bool,
    },
    /// Print a character as JSON
    Show {
        /// Roster index, id, or name
        target: String,
        /// Single-line JSON
        #[arg(long, default_value_t = false)]
        compact: bool,
    },
    /// Print the change log of a character
    Log { target: String },
    /// Set an attribute or skill rating through an edit session
    Set {
        target: String,
        /// Attribute or skill name, e.g. Stamina or "Animal Ken"
        #[arg(long)]
        trait_name: String,
        #[arg(long)]
        value: i32,
    },
    /// Learn a discipline from the catalog, or define a custom one
    Learn {
        target: String,
        #[arg(long)]
        discipline: String,
        /// Define it as a custom discipline instead of taking it from the catalog
        #[arg(long, default_value_t = false)]
        custom: bool,
    },
    /// Forget a discipline and its selected powers
    Forget {
        target: String,
        #[arg(long)]
        discipline: String,
    },
    /// Select or deselect a power
    Toggle {
        target: String,
        #[arg(long)]
        discipline: String,
        #[arg(long)]
        power: String,
        #[arg(long)]
        level: u8,
    },
    /// Move a character to the archive
    Archive { target: String },
    /// Return a character from the archive
    Unarchive { target: String },
    /// Remove the character at a roster index
    Remove { index: usize },
    /// Compare two character JSON files
    Diff { before: PathBuf, after: PathBuf },
    /// Write a compressed transfer payload
    Export {
        target: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// Read a transfer payload or character JSON into the roster
    Import { file: PathBuf },
    /// List catalog disciplines
    Catalog,
}

#[derive(Parser)]
#[command(name = "coterie")]
#[command(about = "Coterie character roster CLI")]
struct Cli {
    /// Roster file
    #[arg(long, global = true, default_value = "coterie.json")]
    store: PathBuf,
    /// Log engine activity to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

fn to_kind(k: KindArg) -> Kind {
    match k {
        KindArg::Vampire => Kind::Vampire,
        KindArg::Ghoul => Kind::Ghoul,
        KindArg::Mage => Kind::Mage,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let mut roster = Roster::open(JsonFileStore::new(&cli.store))
        .with_context(|| format!("failed to open roster: {}", cli.store.display()))?;

    match cli.cmd {
        Cmd::New { kind, name } => {
            let id = roster.add(Character::new(to_kind(kind), name))?;
            println!("{}", id);
        }
        Cmd::List { archived } => {
            for (index, c) in roster.characters().iter().enumerate() {
                if c.sheet.archived == archived {
                    println!("{}\t{}\t{}\t{}", index, c.id(), c.kind(), c.name());
                }
            }
        }
        Cmd::Show { target, compact } => {
            let c = find(&roster, &target)?;
            if compact {
                println!("{}", serde_json::to_string(c)?);
            } else {
                println!("{}", serde_json::to_string_pretty(c)?);
            }
        }
        Cmd::Log { target } => {
            let c = find(&roster, &target)?;
            for entry in &c.sheet.change_log {
                println!("[{}]", entry.timestamp.format("%Y-%m-%d %H:%M"));
                println!("{}", entry.summary);
            }
        }
        Cmd::Set {
            target,
            trait_name,
            value,
        } => {
            edit(&mut roster, &target, |draft| {
                let is_attribute = draft
                    .sheet
                    .attribute_maps()
                    .iter()
                    .any(|m| m.contains(&trait_name));
                let result = if is_attribute {
                    draft.set_attribute(&trait_name, value).map(|_| ())
                } else {
                    draft.set_skill(&trait_name, value)
                };
                result.with_context(|| format!("cannot set '{}' to {}", trait_name, value))
            })?;
        }
        Cmd::Learn {
            target,
            discipline,
            custom,
        } => {
            edit(&mut roster, &target, |draft| {
                let added = if custom {
                    draft.add_custom_discipline(Discipline::new(discipline.as_str()))?
                } else {
                    draft.learn_discipline(standard_discipline(&discipline)?)?
                };
                if !added {
                    eprintln!("{} already knows {}", draft.name(), discipline);
                }
                Ok(())
            })?;
        }
        Cmd::Forget { target, discipline } => {
            edit(&mut roster, &target, |draft| {
                draft.remove_discipline(&discipline)?;
                Ok(())
            })?;
        }
        Cmd::Toggle {
            target,
            discipline,
            power,
            level,
        } => {
            edit(&mut roster, &target, |draft| {
                let id = draft
                    .disciplines()
                    .and_then(|d| d.get(&discipline))
                    .and_then(|d| {
                        d.powers(level)
                            .iter()
                            .find(|p| p.name.eq_ignore_ascii_case(&power))
                    })
                    .map(|p| p.id)
                    .ok_or_else(|| {
                        anyhow!("no power '{}' at level {} of {}", power, level, discipline)
                    })?;
                draft.toggle_power(id, &discipline, level)?;
                Ok(())
            })?;
        }
        Cmd::Archive { target } => {
            let id = find(&roster, &target)?.id();
            roster.archive(id)?;
        }
        Cmd::Unarchive { target } => {
            let id = find(&roster, &target)?.id();
            roster.unarchive(id)?;
        }
        Cmd::Remove { index } => {
            let removed = roster.remove_at(index)?;
            println!("removed {}", removed.name());
        }
        Cmd::Diff { before, after } => {
            let before = load_character(&before)?;
            let after = load_character(&after)?;
            for line in diff(&before, &after)? {
                println!("{}", line);
            }
        }
        Cmd::Export { target, out } => {
            let bytes = transfer::encode(find(&roster, &target)?)?;
            fs::write(&out, &bytes)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("wrote {} bytes", bytes.len());
        }
        Cmd::Import { file } => {
            let bytes =
                fs::read(&file).with_context(|| format!("failed to read {}", file.display()))?;
            let character = if looks_like_json(&bytes) {
                load_character(&file)?
            } else {
                transfer::decode(&bytes)?
            };
            let id = roster.import(character)?;
            println!("{}", id);
        }
        Cmd::Catalog => {
            for d in standard_disciplines()? {
                let count: usize = d.powers.values().map(Vec::len).sum();
                println!("{} ({} powers)", d.name, count);
            }
        }
    }
    Ok(())
}

/// Run `change` on a draft of the target and commit it, printing what was logged.
fn edit(
    roster: &mut Roster<JsonFileStore>,
    target: &str,
    change: impl FnOnce(&mut Character) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let mut session = begin_edit(find(roster, target)?);
    change(session.draft_mut())?;
    match session.commit(roster)? {
        Some(entry) => println!("{}", entry.summary),
        None => println!("no changes"),
    }
    Ok(())
}

/// Resolve a roster index, character id, or case-insensitive name.
fn find<'a>(roster: &'a Roster<JsonFileStore>, target: &str) -> anyhow::Result<&'a Character> {
    if let Ok(index) = target.parse::<usize>() {
        return roster
            .characters()
            .get(index)
            .ok_or_else(|| anyhow!("no character at index {}", index));
    }
    if let Ok(id) = target.parse::<CharacterId>() {
        return roster
            .get(id)
            .ok_or_else(|| anyhow!("no character with id {}", id));
    }
    let mut matches = roster
        .characters()
        .iter()
        .filter(|c| c.name().eq_ignore_ascii_case(target));
    match (matches.next(), matches.next()) {
        (Some(c), None) => Ok(c),
        (Some(_), Some(_)) => bail!("more than one character is named '{}'", target),
        (None, _) => bail!("no character named '{}'", target),
    }
}

fn looks_like_json(bytes: &[u8]) -> bool {
    decode_text(bytes.to_vec()).is_ok_and(|text| text.trim_start().starts_with('{'))
}
