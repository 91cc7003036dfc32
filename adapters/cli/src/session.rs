//! Session files describing a map, a build catalogue and a scripted sequence
//! of player actions.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use castle_defence_core::{
    BuildOption, BuildOptionId, Command, Economy, EnclosureStats, Gold, HexCoord, HexGrid,
    PlayMode, Purse, Rotation, TileKind,
};
use castle_defence_world::{apply, query, World};
use serde::Deserialize;
use tracing::{debug, info};

const SUPPORTED_SESSION_VERSION: u32 = 1;

/// Session replayed when no file is provided: seals a ring east of the castle,
/// builds inside it, then breaks the ring open again.
pub(crate) const DEFAULT_SESSION: &str = r#"
version = 1
grid_radius = 6
starting_gold = 100

[[build_options]]
name = "archer"
cost = 40

[[build_options]]
name = "granary"
cost = 30

[[steps]]
action = "place"
q = 1
r = 0
kind = "split"
rotation = 1

[[steps]]
action = "place"
q = 2
r = -1
kind = "strong_curve"
rotation = 4

[[steps]]
action = "place"
q = 3
r = -1
kind = "strong_curve"
rotation = 3

[[steps]]
action = "place"
q = 3
r = 0
kind = "strong_curve"
rotation = 2

[[steps]]
action = "place"
q = 2
r = 1
kind = "strong_curve"
rotation = 1

[[steps]]
action = "place"
q = 1
r = 1
kind = "strong_curve"
rotation = 0

[[steps]]
action = "build"
q = 2
r = 0
option = "archer"

[[steps]]
action = "recompute"

[[steps]]
action = "place"
q = 3
r = 0
kind = "small_curve"
rotation = 1
allow_replace = true

[[steps]]
action = "mode"
mode = "combat"
"#;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionFile {
    version: u32,
    grid_radius: u32,
    starting_gold: u32,
    #[serde(default)]
    build_options: Vec<BuildOptionEntry>,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BuildOptionEntry {
    name: String,
    cost: u32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Step {
    Place {
        q: i32,
        r: i32,
        kind: TileKind,
        #[serde(default)]
        rotation: i32,
        #[serde(default)]
        allow_replace: bool,
    },
    Remove {
        q: i32,
        r: i32,
    },
    Build {
        q: i32,
        r: i32,
        option: String,
    },
    Demolish {
        q: i32,
        r: i32,
    },
    Recompute,
    Mode {
        mode: PlayMode,
    },
}

/// Validated session ready to be replayed against a fresh world.
#[derive(Debug)]
pub(crate) struct Session {
    grid_radius: u32,
    starting_gold: Gold,
    build_options: Vec<BuildOption>,
    commands: Vec<Command>,
}

impl Session {
    /// Loads and validates the session stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid session file {}", path.display()))
    }

    /// Parses and validates session contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let file: SessionFile =
            toml::from_str(contents).context("failed to parse session toml contents")?;
        if file.version != SUPPORTED_SESSION_VERSION {
            bail!(
                "unsupported session version {}; expected {}",
                file.version,
                SUPPORTED_SESSION_VERSION
            );
        }

        let build_options: Vec<BuildOption> = file
            .build_options
            .into_iter()
            .map(|entry| BuildOption::new(entry.name, Gold::new(entry.cost)))
            .collect();

        let mut commands = Vec::with_capacity(file.steps.len());
        for (index, step) in file.steps.into_iter().enumerate() {
            let command = step_command(step, &build_options)
                .with_context(|| format!("invalid step {}", index + 1))?;
            commands.push(command);
        }

        Ok(Self {
            grid_radius: file.grid_radius,
            starting_gold: Gold::new(file.starting_gold),
            build_options,
            commands,
        })
    }

    /// Replays every command against a fresh world and summarises the result.
    pub(crate) fn replay(self) -> SessionReport {
        let mut world = World::with_options(HexGrid::hexagon(self.grid_radius), self.build_options);
        let mut purse = Purse::new(self.starting_gold);
        let mut events = Vec::new();
        let mut event_count = 0usize;

        info!(
            radius = self.grid_radius,
            gold = %self.starting_gold,
            steps = self.commands.len(),
            "{}",
            query::welcome_banner(&world)
        );

        for command in self.commands {
            debug!(?command, "applying command");
            apply(&mut world, command, &mut purse, &mut events);
            for event in events.drain(..) {
                info!(?event, "world event");
                event_count += 1;
            }
        }

        let structures = query::built(&world)
            .into_iter()
            .map(|(cell, option)| {
                let name = match query::build_option(&world, option) {
                    Some(entry) => entry.name().to_owned(),
                    None => format!("option {}", option.get()),
                };
                (cell, name)
            })
            .collect();

        SessionReport {
            stats: query::enclosure_stats(&world),
            enclosed: query::enclosed_cells(&world),
            structures,
            balance: purse.balance(),
            play_mode: query::play_mode(&world),
            event_count,
        }
    }
}

fn step_command(step: Step, build_options: &[BuildOption]) -> Result<Command> {
    let command = match step {
        Step::Place {
            q,
            r,
            kind,
            rotation,
            allow_replace,
        } => Command::PlaceWall {
            cell: HexCoord::new(q, r),
            kind,
            rotation: Rotation::new(rotation),
            allow_replace,
        },
        Step::Remove { q, r } => Command::RemoveWall {
            cell: HexCoord::new(q, r),
        },
        Step::Build { q, r, option } => {
            let Some(index) = build_options.iter().position(|entry| entry.name() == option) else {
                bail!("unknown build option `{option}`");
            };
            let index = u32::try_from(index).context("build catalogue is too large")?;
            Command::Build {
                cell: HexCoord::new(q, r),
                option: BuildOptionId::new(index),
            }
        }
        Step::Demolish { q, r } => Command::Demolish {
            cell: HexCoord::new(q, r),
        },
        Step::Recompute => Command::RecomputeEnclosure,
        Step::Mode { mode } => Command::SetPlayMode { mode },
    };
    Ok(command)
}

/// Final state of a replayed session.
#[derive(Debug)]
pub(crate) struct SessionReport {
    pub(crate) stats: EnclosureStats,
    pub(crate) enclosed: Vec<HexCoord>,
    pub(crate) structures: Vec<(HexCoord, String)>,
    pub(crate) balance: Gold,
    pub(crate) play_mode: PlayMode,
    pub(crate) event_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const RING: &str = r#"
        version = 1
        grid_radius = 5
        starting_gold = 50

        [[build_options]]
        name = "archer"
        cost = 40

        [[steps]]
        action = "place"
        q = 1
        r = 0
        kind = "split"
        rotation = 1

        [[steps]]
        action = "place"
        q = 2
        r = -1
        kind = "strong_curve"
        rotation = 4

        [[steps]]
        action = "place"
        q = 3
        r = -1
        kind = "strong_curve"
        rotation = 3

        [[steps]]
        action = "place"
        q = 3
        r = 0
        kind = "strong_curve"
        rotation = 2

        [[steps]]
        action = "place"
        q = 2
        r = 1
        kind = "strong_curve"
        rotation = 1

        [[steps]]
        action = "place"
        q = 1
        r = 1
        kind = "strong_curve"
        rotation = 0

        [[steps]]
        action = "build"
        q = 2
        r = 0
        option = "archer"
    "#;

    #[test]
    fn default_session_is_valid() {
        let session = Session::parse(DEFAULT_SESSION).expect("default session parses");
        assert_eq!(session.grid_radius, 6);
        assert_eq!(session.build_options.len(), 2);
        assert_eq!(session.commands.len(), 10);
        assert_eq!(session.commands[7], Command::RecomputeEnclosure);
    }

    #[test]
    fn ring_session_encloses_and_builds() {
        let report = Session::parse(RING).expect("ring session parses").replay();
        assert_eq!(report.enclosed, vec![HexCoord::new(2, 0)]);
        assert_eq!(report.stats.open_gap_count, 0);
        assert_eq!(
            report.structures,
            vec![(HexCoord::new(2, 0), "archer".to_owned())]
        );
        assert_eq!(report.balance, Gold::new(10));
    }

    #[test]
    fn default_session_ends_with_structure_invalidated_without_refund() {
        let report = Session::parse(DEFAULT_SESSION)
            .expect("default session parses")
            .replay();
        assert!(report.enclosed.is_empty());
        assert!(report.structures.is_empty());
        assert_eq!(report.stats.open_gap_count, 1);
        assert_eq!(report.balance, Gold::new(60));
        assert_eq!(report.play_mode, PlayMode::Combat);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let error = Session::parse("version = 2\ngrid_radius = 3\nstarting_gold = 0\n")
            .expect_err("version 2 is unsupported");
        assert!(error.to_string().contains("unsupported session version 2"));
    }

    #[test]
    fn unknown_build_option_names_the_step() {
        let contents = r#"
            version = 1
            grid_radius = 3
            starting_gold = 0

            [[steps]]
            action = "recompute"

            [[steps]]
            action = "build"
            q = 0
            r = 1
            option = "moat"
        "#;
        let error = Session::parse(contents).expect_err("moat is not in the catalogue");
        assert_eq!(error.to_string(), "invalid step 2");
        assert!(format!("{error:#}").contains("unknown build option `moat`"));
    }

    #[test]
    fn unknown_action_fails_to_parse() {
        let contents = r#"
            version = 1
            grid_radius = 3
            starting_gold = 0

            [[steps]]
            action = "teleport"
        "#;
        assert!(Session::parse(contents).is_err());
    }

    #[test]
    fn rejected_steps_do_not_abort_replay() {
        let contents = r#"
            version = 1
            grid_radius = 3
            starting_gold = 25

            [[steps]]
            action = "place"
            q = 2
            r = -2
            kind = "straight"

            [[steps]]
            action = "remove"
            q = 1
            r = 0

            [[steps]]
            action = "demolish"
            q = 1
            r = 0
        "#;
        let report = Session::parse(contents).expect("session parses").replay();
        assert_eq!(report.event_count, 3);
        assert_eq!(report.stats.wall_count, 0);
        assert_eq!(report.balance, Gold::new(25));
    }
}
