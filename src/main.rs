use docopt::Docopt;
use error_chain::bail;
use itertools::Itertools;
use serde_derive::Deserialize;
use mazes::{
    analysis,
    cells::Cartesian2DCoordinate,
    generators::{self, Chooser, GenerationStats, GeneratorOptions, GeneratorOptionsBuilder,
                 RandomChooser, StartCell},
    grid::Grid,
    grid_displays::{BlankDisplay, VisitedDisplay},
    logging::{LogEvent, LogLevel, Logger},
    renderers::{NoopRenderer, Renderer, RenderOptionsBuilder, TextRenderer},
    units,
};
use std::{
    io,
    io::prelude::*,
    fs::File,
    time::Duration,
};

const USAGE: &str = "Mazes

Usage:
    mazes_driver -h | --help
    mazes_driver [--width=<w>] [--height=<h>] [--seed=<n>] [--start=<x,y> | --random-start] [--animate] [--delay-ms=<ms>] [--render-backtracks] [--random-walk] [--show-visited] [--text-out=<path>] [--verify] [--log-level=<level>]

Options:
    -h --help              Show this screen.
    --width=<w>            The grid width in a w*h grid [default: 20].
    --height=<h>           The grid height in a w*h grid [default: 15].
    --seed=<n>             Seed the random choices, the same seed gives the same maze.
    --start=<x,y>          Cell to start carving from [default: 0,0].
    --random-start         Start carving from a random cell.
    --animate              Draw the grid after every carving step.
    --delay-ms=<ms>        Pause between animation frames in milliseconds [default: 50].
    --render-backtracks    When animating, also draw a frame for every backtracking step.
    --random-walk          Carve a single random walk instead of a full maze.
    --show-visited         Shade cells the generator has not reached.
    --text-out=<path>      Output file path for a textual rendering of the finished maze.
    --verify               Check the finished maze is perfect, fail if it is not.
    --log-level=<level>    Minimum level of the JSON log written to stderr [default: info].
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_width: usize,
    flag_height: usize,
    flag_seed: Option<u64>,
    flag_start: String,
    flag_random_start: bool,
    flag_animate: bool,
    flag_delay_ms: u64,
    flag_render_backtracks: bool,
    flag_random_walk: bool,
    flag_show_visited: bool,
    flag_text_out: String,
    flag_verify: bool,
    flag_log_level: String,
}

mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Maze(::mazes::errors::Error, ::mazes::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
            Generate(::mazes::generators::GenerateError<::std::io::Error>);
        }
    }
}
use crate::errors::*;

const LOG_TARGET: &str = "mazes_driver";

fn main() -> Result<()> {

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    let log_level: LogLevel = args.flag_log_level.parse()?;
    let mut logger = Logger::new(log_level, io::stderr());

    let mut maze_grid = Grid::new(units::Width(args.flag_width), units::Height(args.flag_height))?;
    let options = generator_options(&args)?;
    let mut chooser = match args.flag_seed {
        Some(seed) => RandomChooser::seeded(seed),
        None => RandomChooser::from_entropy(),
    };

    logger.log(&LogEvent::new(LogLevel::Info, LOG_TARGET, "generating maze")
        .field("width", args.flag_width)
        .field("height", args.flag_height)
        .field("seed", args.flag_seed)
        .field("algorithm", if args.flag_random_walk { "random-walk" } else { "recursive-backtracker" })
        .field("animate", args.flag_animate))?;

    let stats = if args.flag_animate {
        let render_options = RenderOptionsBuilder::new()
            .clear_screen(true)
            .show_visited(args.flag_show_visited)
            .build();
        let stdout = io::stdout();
        let mut renderer = TextRenderer::new(stdout.lock(), render_options);
        generate(&mut maze_grid, &mut chooser, &options, &mut renderer, args.flag_random_walk)?
    } else {
        // The finished maze is printed below, no intermediate frames needed.
        let mut renderer = NoopRenderer;
        generate(&mut maze_grid, &mut chooser, &options, &mut renderer, args.flag_random_walk)
            .map_err(|err| match err {
                generators::GenerateError::Grid(e) => Error::from(e),
                generators::GenerateError::Render(never) => match never {},
            })?
    };

    log_stats(&mut logger, &stats)?;

    let text = if args.flag_show_visited {
        maze_grid.display_with(&VisitedDisplay).to_string()
    } else {
        maze_grid.display_with(&BlankDisplay).to_string()
    };
    if args.flag_text_out.is_empty() {
        if !args.flag_animate {
            print!("{}", text);
        }
    } else {
        write_text_to_file(&text, &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }

    if args.flag_verify {
        verify(&mut logger, &maze_grid)?;
    }

    Ok(())
}

fn generator_options(args: &MazeArgs) -> Result<GeneratorOptions> {
    let start = if args.flag_random_start {
        StartCell::Random
    } else {
        StartCell::At(parse_start(&args.flag_start)?)
    };

    Ok(GeneratorOptionsBuilder::new()
        .start(start)
        .animate(args.flag_animate)
        .step_delay(Duration::from_millis(args.flag_delay_ms))
        .render_backtracks(args.flag_render_backtracks)
        .build())
}

fn parse_start(text: &str) -> Result<Cartesian2DCoordinate> {
    let (x, y) = text.split(',')
        .map(str::trim)
        .collect_tuple::<(&str, &str)>()
        .ok_or_else(|| format!("Start cell '{}' should look like x,y", text))?;
    let x = x.parse::<u32>().chain_err(|| format!("Invalid start x coordinate '{}'", x))?;
    let y = y.parse::<u32>().chain_err(|| format!("Invalid start y coordinate '{}'", y))?;
    Ok(Cartesian2DCoordinate::new(x, y))
}

fn generate<C, R>(maze_grid: &mut Grid,
                  chooser: &mut C,
                  options: &GeneratorOptions,
                  renderer: &mut R,
                  random_walk: bool)
                  -> generators::GenerateResult<R::Error>
    where C: Chooser,
          R: Renderer
{
    if random_walk {
        generators::random_walk(maze_grid, chooser, options, renderer)
    } else {
        generators::recursive_backtracker(maze_grid, chooser, options, renderer)
    }
}

fn log_stats<W: Write>(logger: &mut Logger<W>, stats: &GenerationStats) -> Result<()> {
    let start = stats.start.map(|coord| coord.to_string());
    logger.log(&LogEvent::new(LogLevel::Info, LOG_TARGET, "maze generated")
        .field("start", start)
        .field("cells_visited", stats.cells_visited)
        .field("walls_cleared", stats.walls_cleared)
        .field("backtracks", stats.backtracks)
        .field("frames_rendered", stats.frames_rendered)
        .field("completed", stats.completed))?;
    Ok(())
}

fn verify<W: Write>(logger: &mut Logger<W>, maze_grid: &Grid) -> Result<()> {
    let report = analysis::analyse(maze_grid);
    let level = if report.is_perfect() { LogLevel::Info } else { LogLevel::Error };
    logger.log(&LogEvent::new(level, LOG_TARGET, "maze verified")
        .field("perfect", report.is_perfect())
        .field("passages", report.passages)
        .field("dead_ends", report.dead_ends)
        .field("connected_components", report.connected_components)
        .field("acyclic", report.acyclic)
        .field("symmetric", report.symmetric))?;

    if report.is_perfect() {
        Ok(())
    } else {
        bail!("The maze is not perfect: {:?}", report)
    }
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}
