use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;
use mallnav_core::content::seeded_venue;
use mallnav_core::{
    Cell, Coord, HaltReason, LandmarkKind, NavSession, Pace, Position, Step, StepResult, Venue,
    layout_file, plan_route,
};

mod config;

use config::Config;

#[derive(Parser)]
#[command(author, version, about = "Multi-floor venue navigation", long_about = None)]
struct Args {
    /// Config file (defaults to mallnav.toml in the platform config dir or working dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Layout JSON file (defaults to layout.json in the platform data dir)
    #[arg(long, global = true)]
    layout: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the built-in venue layout
    Init {
        /// Overwrite an existing layout
        #[arg(long)]
        force: bool,
    },
    /// List every shop in the layout
    Shops,
    /// Print a floor as a character grid
    Show {
        #[arg(long)]
        floor: String,
    },
    /// Shortest walk between two tiles on one floor
    Path {
        #[arg(long)]
        floor: String,
        #[arg(long, value_parser = parse_coord)]
        from: Coord,
        #[arg(long, value_parser = parse_coord)]
        to: Coord,
    },
    /// Plan a route through selected shops, optionally walking it
    Route {
        #[arg(long)]
        floor: String,
        #[arg(long, value_parser = parse_coord)]
        from: Coord,
        #[arg(long = "target", value_parser = parse_coord, required = true)]
        targets: Vec<Coord>,
        /// Animate the walk step by step (Ctrl-C stops it)
        #[arg(long)]
        walk: bool,
        #[arg(long)]
        speed: Option<u32>,
    },
    /// Walk the built-in demo route on the ground floor
    Demo {
        #[arg(long)]
        speed: Option<u32>,
    },
    /// Edit shops; changes are saved back to the layout file
    #[command(subcommand)]
    Shop(ShopCommand),
}

#[derive(Subcommand)]
enum ShopCommand {
    /// Place a new shop on the first empty tile of a floor
    Add {
        #[arg(long)]
        floor: String,
    },
    /// Create or overwrite the shop on a tile
    Set {
        #[arg(long)]
        floor: String,
        #[arg(long, value_parser = parse_coord)]
        at: Coord,
        #[arg(long)]
        name: String,
        /// Items as "name:price, name:price"
        #[arg(long, default_value = "")]
        items: String,
    },
    /// Turn a shop tile back into an empty tile
    Delete {
        #[arg(long)]
        floor: String,
        #[arg(long, value_parser = parse_coord)]
        at: Coord,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    Builder::new()
        .filter_level(match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .parse_default_env()
        .init();

    let config = Config::load(args.config.as_deref())?;
    let layout_path = match args.layout {
        Some(path) => path,
        None => config::default_layout_path()
            .context("no platform data directory; pass --layout to choose a layout file")?,
    };

    match args.command {
        Command::Init { force } => init(&config, &layout_path, force),
        Command::Shops => {
            let venue = load_venue(&config, &layout_path)?;
            for listing in venue.shops() {
                println!(
                    "{:<16} floor {:<3} {:<8} {} item(s)",
                    listing.meta.name,
                    listing.floor_label,
                    listing.coord.to_string(),
                    listing.meta.items.len()
                );
            }
            Ok(())
        }
        Command::Show { floor } => {
            let venue = load_venue(&config, &layout_path)?;
            let floor = resolve_floor(&venue, &floor)?;
            print!("{}", render_floor(&venue, floor, &[]));
            Ok(())
        }
        Command::Path { floor, from, to } => {
            let venue = load_venue(&config, &layout_path)?;
            let floor = resolve_floor(&venue, &floor)?;
            let path = venue.shortest_path(floor, venue.to_index(from)?, venue.to_index(to)?)?;
            println!("{} node(s): {}", path.len(), describe_path(&venue, &path));
            let marks: Vec<usize> = path.iter().map(|position| position.index).collect();
            print!("{}", render_floor(&venue, floor, &marks));
            Ok(())
        }
        Command::Route { floor, from, targets, walk, speed } => {
            let venue = load_venue(&config, &layout_path)?;
            let floor = resolve_floor(&venue, &floor)?;
            let mut session = NavSession::new(venue, config.session.seed);
            let start = select_route(&mut session, floor, from, &targets)?;

            let venue = session.venue();
            let plan = plan_route(venue, start, session.targets())?;
            for (stop, position) in plan.visit_order.iter().enumerate() {
                println!("stop {}: {}", stop + 1, describe_tile(venue, *position));
            }
            for position in &plan.dropped {
                println!("skipped (unreachable): {}", describe_tile(venue, *position));
            }
            let shown = describe_path(venue, plan.route.positions());
            println!("{} node(s): {shown}", plan.route.len());

            if walk {
                let (_, first) = session.begin_route()?;
                let speed = speed.unwrap_or(config.traversal.speed);
                report_halt(walk_route(&mut session, first, config.traversal.pace(), speed)?);
            }
            Ok(())
        }
        Command::Demo { speed } => {
            let venue = load_venue(&config, &layout_path)?;
            let mut session = NavSession::new(venue, config.session.seed);
            let first = session.demo_route()?;
            let speed = speed.unwrap_or(config.traversal.speed);
            report_halt(walk_route(&mut session, first, config.traversal.pace(), speed)?);
            Ok(())
        }
        Command::Shop(command) => edit_shop(&config, &layout_path, command),
    }
}

/// Places the avatar at `from` and selects every target, so a tile that is
/// not a shop is rejected before any route is planned or walked.
fn select_route(
    session: &mut NavSession,
    floor: usize,
    from: Coord,
    targets: &[Coord],
) -> Result<Position> {
    let start = session.venue().position(floor, from)?;
    session.switch_floor(floor)?;
    session.set_location(start)?;
    for &coord in targets {
        let target = session.venue().position(floor, coord)?;
        if !session.targets().contains(target) {
            session
                .toggle_target(target)
                .with_context(|| format!("target {coord} must be a shop"))?;
        }
    }
    Ok(start)
}

fn init(config: &Config, layout_path: &Path, force: bool) -> Result<()> {
    if layout_path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite it", layout_path.display());
    }
    let venue = default_venue(config)?;
    layout_file::write_atomic(&venue, layout_path)
        .with_context(|| format!("failed to write layout {}", layout_path.display()))?;
    println!("Wrote {} floor(s) to {}", venue.floor_count(), layout_path.display());
    Ok(())
}

fn edit_shop(config: &Config, layout_path: &Path, command: ShopCommand) -> Result<()> {
    let venue = load_venue(config, layout_path)?;
    let mut session = NavSession::new(venue, config.session.seed);

    match command {
        ShopCommand::Add { floor } => {
            let floor = resolve_floor(session.venue(), &floor)?;
            let index = session.add_shop(floor)?;
            println!("Added shop at {}", describe_tile(session.venue(), Position::new(floor, index)));
        }
        ShopCommand::Set { floor, at, name, items } => {
            let floor = resolve_floor(session.venue(), &floor)?;
            let index = session.venue().to_index(at)?;
            session.save_shop(floor, index, &name, &items)?;
            println!("Saved {}", describe_tile(session.venue(), Position::new(floor, index)));
        }
        ShopCommand::Delete { floor, at } => {
            let floor = resolve_floor(session.venue(), &floor)?;
            let index = session.venue().to_index(at)?;
            let removed = session.delete_shop(floor, index)?;
            println!("Deleted {} at {at}", removed.name);
        }
    }

    layout_file::write_atomic(session.venue(), layout_path)
        .with_context(|| format!("failed to save layout {}", layout_path.display()))?;
    Ok(())
}

/// The built-in layout when the configured grid matches it, otherwise an
/// empty venue of the configured shape.
fn default_venue(config: &Config) -> Result<Venue> {
    let dims = config.venue.dims()?;
    let seeded = seeded_venue();
    if seeded.dims() == dims && seeded.labels() == config.venue.floors.as_slice() {
        return Ok(seeded);
    }
    log::info!("configured grid differs from the built-in layout, starting empty");
    Ok(Venue::new(dims, config.venue.floors.clone()))
}

fn load_venue(config: &Config, layout_path: &Path) -> Result<Venue> {
    if !layout_path.exists() {
        log::info!("no layout at {}, using the built-in venue", layout_path.display());
        return default_venue(config);
    }
    let dims = config.venue.dims()?;
    layout_file::load(layout_path, dims, config.venue.floors.clone())
        .with_context(|| format!("failed to load layout {}", layout_path.display()))
}

fn resolve_floor(venue: &Venue, label: &str) -> Result<usize> {
    venue
        .floor_by_label(label)
        .with_context(|| format!("unknown floor {label:?}; floors are {}", venue.labels().join(", ")))
}

fn parse_coord(raw: &str) -> Result<Coord, String> {
    let (x, y) = raw.split_once(',').ok_or_else(|| format!("expected X,Y but got {raw:?}"))?;
    let axis = |value: &str| {
        value.trim().parse::<usize>().map_err(|err| format!("bad coordinate {value:?}: {err}"))
    };
    Ok(Coord { x: axis(x)?, y: axis(y)? })
}

/// Steps through the walk in progress, waiting `pace.delay_for(speed)`
/// between moves. Ctrl-C raises the walk's cancel token.
fn walk_route(session: &mut NavSession, first: Step, pace: Pace, speed: u32) -> Result<HaltReason> {
    if let Some(token) = session.walk_token() {
        ctrlc::set_handler(move || token.raise()).context("failed to install Ctrl-C handler")?;
    }
    let delay = pace.delay_for(speed);
    log::debug!("walking at speed {speed}, {}ms per step", delay.as_millis());

    print_step(session.venue(), &first);
    loop {
        thread::sleep(delay);
        match session.advance() {
            StepResult::Stepped(step) => print_step(session.venue(), &step),
            StepResult::Halted(reason) => return Ok(reason),
        }
    }
}

fn print_step(venue: &Venue, step: &Step) {
    if let Some(switch) = step.floor_switch {
        println!("-- floor {} --", venue.floor_label(switch.to).unwrap_or("?"));
    }
    println!("{:<40} {} left", describe_tile(venue, step.position), step.remaining.len());
}

fn report_halt(reason: HaltReason) {
    match reason {
        HaltReason::Arrived => println!("Arrived."),
        HaltReason::Cancelled => println!("Walk cancelled."),
        HaltReason::Idle => {}
    }
}

fn describe_tile(venue: &Venue, position: Position) -> String {
    let label = venue.floor_label(position.floor).unwrap_or("?");
    let coord = venue.to_coord(position.index).map(|coord| coord.to_string()).unwrap_or_default();
    match venue.cell_at(position.floor, position.index) {
        Ok(Cell::Shop(meta)) => format!("{} (floor {label} {coord})", meta.name),
        Ok(Cell::Landmark(kind)) => format!("{} (floor {label} {coord})", kind.label()),
        _ => format!("floor {label} {coord}"),
    }
}

fn describe_path(venue: &Venue, path: &[Position]) -> String {
    path.iter()
        .filter_map(|position| venue.to_coord(position.index).ok())
        .map(|coord| coord.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn render_floor(venue: &Venue, floor: usize, marks: &[usize]) -> String {
    let Ok(layer) = venue.floor(floor) else {
        return String::new();
    };
    let cols = venue.dims().cols();
    let mut out = String::with_capacity(layer.cells().len() + venue.dims().rows());
    for (index, cell) in layer.cells().iter().enumerate() {
        out.push(if marks.contains(&index) { '*' } else { glyph(cell) });
        if (index + 1) % cols == 0 {
            out.push('\n');
        }
    }
    out
}

fn glyph(cell: &Cell) -> char {
    match cell {
        Cell::Empty => '.',
        Cell::Blocked => '#',
        Cell::Landmark(LandmarkKind::Office) => 'O',
        Cell::Landmark(LandmarkKind::Washroom) => 'W',
        Cell::Landmark(LandmarkKind::Escalator) => 'E',
        Cell::Shop(_) => 'S',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mallnav_core::GridDims;
    use tempfile::tempdir;

    #[test]
    fn coordinates_parse_from_cli_text() {
        assert_eq!(parse_coord("3,2"), Ok(Coord { x: 3, y: 2 }));
        assert_eq!(parse_coord(" 12 , 8"), Ok(Coord { x: 12, y: 8 }));
        assert!(parse_coord("3").is_err());
        assert!(parse_coord("a,1").is_err());
    }

    #[test]
    fn floor_render_marks_path_tiles() {
        let mut venue = Venue::new(GridDims::new(3, 2).unwrap(), vec!["G".into()]);
        venue.set_cell(0, 1, Cell::Blocked).unwrap();
        venue.set_cell(0, 5, Cell::Landmark(LandmarkKind::Escalator)).unwrap();

        assert_eq!(render_floor(&venue, 0, &[]), ".#.\n..E\n");
        assert_eq!(render_floor(&venue, 0, &[0, 3, 4]), "*#.\n**E\n");
    }

    #[test]
    fn route_targets_must_be_shops() {
        let mut session = NavSession::new(seeded_venue(), 0);
        let from = Coord { x: 1, y: 4 };
        let err = select_route(&mut session, 0, from, &[Coord { x: 5, y: 5 }]).unwrap_err();
        assert!(err.to_string().contains("must be a shop"));
        assert!(session.begin_route().is_err());
    }

    #[test]
    fn walked_route_matches_printed_plan() {
        let mut session = NavSession::new(seeded_venue(), 0);
        let targets = [Coord { x: 3, y: 2 }, Coord { x: 2, y: 2 }, Coord { x: 3, y: 2 }];
        let start = select_route(&mut session, 0, Coord { x: 1, y: 4 }, &targets).unwrap();
        assert_eq!(session.targets().len(), 2);

        let printed = plan_route(session.venue(), start, session.targets()).unwrap();
        let (walked, first) = session.begin_route().unwrap();
        assert_eq!(walked, printed);
        assert_eq!(first.position, start);
    }

    #[test]
    fn missing_layout_falls_back_to_built_in_venue() {
        let dir = tempdir().unwrap();
        let venue = load_venue(&Config::default(), &dir.path().join("layout.json")).unwrap();
        assert_eq!(venue.shops().count(), 4);
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("layout.json");
        let config = Config::default();

        init(&config, &path, false).unwrap();
        assert!(init(&config, &path, false).is_err());
        init(&config, &path, true).unwrap();
        assert_eq!(load_venue(&config, &path).unwrap(), seeded_venue());
    }

    #[test]
    fn custom_grid_starts_empty() {
        let config = Config::from_toml("[venue]\ncols = 4\nrows = 3\nfloors = [\"A\"]\n").unwrap();
        let venue = default_venue(&config).unwrap();
        assert_eq!(venue.dims(), GridDims::new(4, 3).unwrap());
        assert_eq!(venue.shops().count(), 0);
    }

    #[test]
    fn shop_edits_are_saved_to_the_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("layout.json");
        let config = Config::default();
        init(&config, &path, false).unwrap();

        let at = Coord { x: 5, y: 5 };
        edit_shop(
            &config,
            &path,
            ShopCommand::Set {
                floor: "1".into(),
                at,
                name: "Books".into(),
                items: "novel:350".into(),
            },
        )
        .unwrap();
        let venue = load_venue(&config, &path).unwrap();
        let index = venue.to_index(at).unwrap();
        assert_eq!(venue.cell_at(1, index).unwrap().shop().unwrap().name, "Books");

        edit_shop(&config, &path, ShopCommand::Delete { floor: "1".into(), at }).unwrap();
        let venue = load_venue(&config, &path).unwrap();
        assert_eq!(venue.cell_at(1, index), Ok(&Cell::Empty));
    }
}
