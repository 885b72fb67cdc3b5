//! Maze generation algorithms.
//!
//! The recursive backtracker is a randomised depth first search over the grid's
//! cells. It visits every cell exactly once and carves a passage for every step
//! onto a new cell, so it always produces a perfect maze: a spanning tree with
//! `size - 1` passages. The explicit stack stands in for recursion.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error;
use std::fmt;
use std::thread;
use std::time::Duration;

use crate::cells::Cartesian2DCoordinate;
use crate::errors;
use crate::errors::ErrorKind;
use crate::grid::Grid;
use crate::renderers::Renderer;

/// The source of randomness for the generators: pick one of `len` items.
pub trait Chooser {
    /// Returns an index in `0..len`. Never called with a `len` of zero.
    fn choose(&mut self, len: usize) -> usize;
}

impl<'a, C: Chooser + ?Sized> Chooser for &'a mut C {
    fn choose(&mut self, len: usize) -> usize {
        (**self).choose(len)
    }
}

/// Uniform choices from any `rand::Rng`.
#[derive(Debug, Clone)]
pub struct RandomChooser<R = StdRng> {
    rng: R,
}

impl RandomChooser<StdRng> {
    /// Same seed, same choices, same maze.
    pub fn seeded(seed: u64) -> RandomChooser<StdRng> {
        RandomChooser::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> RandomChooser<StdRng> {
        RandomChooser::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomChooser<R> {
    pub fn new(rng: R) -> RandomChooser<R> {
        RandomChooser { rng }
    }
}

impl<R: Rng> Chooser for RandomChooser<R> {
    fn choose(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Replays a fixed list of choices, cycling when exhausted. Each value is wrapped into range.
#[derive(Debug, Clone)]
pub struct SequenceChooser {
    choices: Vec<usize>,
    next: usize,
}

impl SequenceChooser {
    pub fn new(choices: Vec<usize>) -> SequenceChooser {
        SequenceChooser { choices, next: 0 }
    }
}

impl Chooser for SequenceChooser {
    fn choose(&mut self, len: usize) -> usize {
        if self.choices.is_empty() {
            return 0;
        }
        let choice = self.choices[self.next % self.choices.len()];
        self.next += 1;
        choice % len
    }
}

/// Where the generator starts carving.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum StartCell {
    TopLeft,
    At(Cartesian2DCoordinate),
    /// Drawn from the generator's `Chooser` before carving begins.
    Random,
}

impl Default for StartCell {
    fn default() -> StartCell {
        StartCell::TopLeft
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct GeneratorOptions {
    pub start: StartCell,
    /// Render every step instead of only the finished maze.
    pub animate: bool,
    /// Pause after each animation frame.
    pub step_delay: Duration,
    /// Also render a frame when backtracking, only applies when animating.
    pub render_backtracks: bool,
    /// Stop after this many carving steps, backtracking is not counted.
    pub max_steps: Option<usize>,
}

impl Default for GeneratorOptions {
    fn default() -> GeneratorOptions {
        GeneratorOptions {
            start: StartCell::TopLeft,
            animate: false,
            step_delay: Duration::from_millis(0),
            render_backtracks: false,
            max_steps: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct GeneratorOptionsBuilder {
    options: GeneratorOptions,
}

impl GeneratorOptionsBuilder {
    pub fn new() -> GeneratorOptionsBuilder {
        GeneratorOptionsBuilder::default()
    }
    pub fn start(mut self, start: StartCell) -> Self {
        self.options.start = start;
        self
    }
    pub fn animate(mut self, animate: bool) -> Self {
        self.options.animate = animate;
        self
    }
    pub fn step_delay(mut self, step_delay: Duration) -> Self {
        self.options.step_delay = step_delay;
        self
    }
    pub fn render_backtracks(mut self, render_backtracks: bool) -> Self {
        self.options.render_backtracks = render_backtracks;
        self
    }
    pub fn max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.options.max_steps = max_steps;
        self
    }
    pub fn build(self) -> GeneratorOptions {
        self.options
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Default)]
pub struct GenerationStats {
    pub start: Option<Cartesian2DCoordinate>,
    pub cells_visited: usize,
    pub walls_cleared: usize,
    pub backtracks: usize,
    pub frames_rendered: usize,
    /// False when `max_steps` cut generation short.
    pub completed: bool,
}

/// Generation fails either on the grid (bad start, used grid) or in the renderer.
/// Renderer errors are passed through untouched.
#[derive(Debug)]
pub enum GenerateError<E> {
    Grid(errors::Error),
    Render(E),
}

impl<E> From<errors::Error> for GenerateError<E> {
    fn from(err: errors::Error) -> GenerateError<E> {
        GenerateError::Grid(err)
    }
}

impl<E: fmt::Display> fmt::Display for GenerateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GenerateError::Grid(ref err) => write!(f, "maze generation failed: {}", err),
            GenerateError::Render(ref err) => write!(f, "maze rendering failed: {}", err),
        }
    }
}

impl<E: error::Error + 'static> error::Error for GenerateError<E> {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            GenerateError::Grid(ref err) => Some(err),
            GenerateError::Render(ref err) => Some(err),
        }
    }
}

pub type GenerateResult<E> = Result<GenerationStats, GenerateError<E>>;

/// Carve a perfect maze into a fresh grid with the recursive backtracker.
///
/// With `options.animate` the renderer sees the fully walled grid, then one
/// frame per carved passage (and per backtrack if `render_backtracks`),
/// otherwise it is called once with the finished maze.
pub fn recursive_backtracker<C, R>(grid: &mut Grid,
                                   chooser: &mut C,
                                   options: &GeneratorOptions,
                                   renderer: &mut R)
                                   -> GenerateResult<R::Error>
    where C: Chooser + ?Sized,
          R: Renderer + ?Sized
{
    let start = start_cell(grid, chooser, options)?;
    let mut frames = Frames::new(renderer, options);
    let mut stats = GenerationStats {
        start: Some(start),
        ..GenerationStats::default()
    };

    grid.mark_visited(start)?;
    stats.cells_visited = 1;
    frames.step(grid)?;

    let mut stack: Vec<Cartesian2DCoordinate> = Vec::with_capacity(grid.size());
    let mut current = Some(start);

    while let Some(cell) = current {
        let neighbours = grid.unvisited_neighbours(cell)?;
        if neighbours.is_empty() {
            current = stack.pop();
            if current.is_some() {
                stats.backtracks += 1;
                if options.render_backtracks {
                    frames.step(grid)?;
                }
            }
        } else {
            if options.max_steps.map_or(false, |limit| stats.walls_cleared >= limit) {
                break;
            }
            let next = neighbours[chooser.choose(neighbours.len()) % neighbours.len()];
            grid.mark_visited(next)?;
            grid.clear_wall_between(cell, next)?;
            stack.push(cell);
            current = Some(next);

            stats.cells_visited += 1;
            stats.walls_cleared += 1;
            frames.step(grid)?;
        }
    }

    stats.completed = current.is_none();
    frames.finish(grid)?;
    stats.frames_rendered = frames.rendered;
    Ok(stats)
}

/// Carve a single random walk from the start cell until it reaches a cell with
/// no unvisited neighbours. There is no backtracking, so unless the walk happens
/// to cover the grid some cells stay walled off.
pub fn random_walk<C, R>(grid: &mut Grid,
                         chooser: &mut C,
                         options: &GeneratorOptions,
                         renderer: &mut R)
                         -> GenerateResult<R::Error>
    where C: Chooser + ?Sized,
          R: Renderer + ?Sized
{
    let start = start_cell(grid, chooser, options)?;
    let mut frames = Frames::new(renderer, options);
    let mut stats = GenerationStats {
        start: Some(start),
        ..GenerationStats::default()
    };

    grid.mark_visited(start)?;
    stats.cells_visited = 1;
    frames.step(grid)?;

    let mut current = start;
    let mut neighbours = grid.unvisited_neighbours(current)?;
    stats.completed = true;

    while !neighbours.is_empty() {
        if options.max_steps.map_or(false, |limit| stats.walls_cleared >= limit) {
            stats.completed = false;
            break;
        }

        let next = neighbours[chooser.choose(neighbours.len()) % neighbours.len()];
        grid.mark_visited(next)?;
        grid.clear_wall_between(current, next)?;
        current = next;

        stats.cells_visited += 1;
        stats.walls_cleared += 1;
        frames.step(grid)?;

        neighbours = grid.unvisited_neighbours(current)?;
    }

    frames.finish(grid)?;
    stats.frames_rendered = frames.rendered;
    Ok(stats)
}

fn start_cell<C>(grid: &Grid, chooser: &mut C, options: &GeneratorOptions) -> errors::Result<Cartesian2DCoordinate>
    where C: Chooser + ?Sized
{
    if grid.visited_count() > 0 {
        return Err(ErrorKind::Configuration(String::from("generation needs a freshly created grid with no visited cells")).into());
    }

    let start = match options.start {
        StartCell::TopLeft => Cartesian2DCoordinate::new(0, 0),
        StartCell::At(coord) => coord,
        StartCell::Random => grid.random_cell(chooser),
    };
    if !grid.is_valid_coordinate(start) {
        return Err(ErrorKind::OutOfBounds(start, grid.width(), grid.height()).into());
    }
    Ok(start)
}

// Decides which steps reach the renderer and paces the animation.
struct Frames<'r, R: Renderer + ?Sized> {
    renderer: &'r mut R,
    animate: bool,
    step_delay: Duration,
    rendered: usize,
}

impl<'r, R: Renderer + ?Sized> Frames<'r, R> {
    fn new(renderer: &'r mut R, options: &GeneratorOptions) -> Frames<'r, R> {
        Frames {
            renderer,
            animate: options.animate,
            step_delay: options.step_delay,
            rendered: 0,
        }
    }

    fn step(&mut self, grid: &Grid) -> Result<(), GenerateError<R::Error>> {
        if self.animate {
            self.render(grid)?;
            if self.step_delay > Duration::from_millis(0) {
                thread::sleep(self.step_delay);
            }
        }
        Ok(())
    }

    fn finish(&mut self, grid: &Grid) -> Result<(), GenerateError<R::Error>> {
        if !self.animate {
            self.render(grid)?;
        }
        Ok(())
    }

    fn render(&mut self, grid: &Grid) -> Result<(), GenerateError<R::Error>> {
        self.renderer.render(grid).map_err(GenerateError::Render)?;
        self.rendered += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {

    use quickcheck::{quickcheck, TestResult};
    use std::io;

    use super::*;
    use crate::analysis;
    use crate::cells::CompassPrimary;
    use crate::renderers::{FrameRecorder, NoopRenderer};
    use crate::units::{Height, Width};

    fn gc(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x, y)
    }

    fn grid(w: usize, h: usize) -> Grid {
        Grid::new(Width(w), Height(h)).expect("valid grid dimensions")
    }

    fn seeded_maze(w: usize, h: usize, seed: u64, options: &GeneratorOptions) -> (Grid, GenerationStats) {
        let mut g = grid(w, h);
        let stats = recursive_backtracker(&mut g, &mut RandomChooser::seeded(seed), options, &mut NoopRenderer)
            .expect("generation on a fresh grid");
        (g, stats)
    }

    #[test]
    fn single_cell_grid_needs_no_passages() {
        let (g, stats) = seeded_maze(1, 1, 1, &GeneratorOptions::default());
        assert_eq!(stats.walls_cleared, 0);
        assert_eq!(stats.cells_visited, 1);
        assert_eq!(stats.backtracks, 0);
        assert!(stats.completed);
        assert!(g.cell_at(0, 0).unwrap().is_visited());
        assert_eq!(g.cell_at(0, 0).unwrap().walls(), [true; 4]);
        assert!(analysis::analyse(&g).is_perfect());
    }

    #[test]
    fn two_cell_grid_has_one_passage() {
        let (g, stats) = seeded_maze(2, 1, 99, &GeneratorOptions::default());
        assert_eq!(stats.walls_cleared, 1);
        let first = g.cell_at(0, 0).unwrap();
        let second = g.cell_at(1, 0).unwrap();
        assert!(first.is_open(CompassPrimary::East));
        assert!(second.is_open(CompassPrimary::West));
        assert_eq!(first.walls(), [true, false, true, true]);
        assert_eq!(second.walls(), [true, true, true, false]);
        assert_eq!(g.passages().collect::<Vec<_>>(), vec![(gc(0, 0), gc(1, 0))]);
    }

    #[test]
    fn three_by_three_is_reproducible() {
        let options = GeneratorOptions::default();
        let (first, stats) = seeded_maze(3, 3, 2024, &options);
        let (second, _) = seeded_maze(3, 3, 2024, &options);

        assert_eq!(stats.walls_cleared, 8);
        assert_eq!(stats.cells_visited, 9);
        assert!(first.cells().iter().all(|cell| cell.is_visited()));
        assert_eq!(first.passages_count(), 8);
        assert_eq!(first.passages().collect::<Vec<_>>(), second.passages().collect::<Vec<_>>());
        assert_eq!(first, second);
    }

    #[test]
    fn scripted_choices_carve_known_maze() {
        let mut g = grid(2, 2);
        let mut recorder = FrameRecorder::new();
        let options = GeneratorOptionsBuilder::new()
            .animate(true)
            .render_backtracks(true)
            .build();
        let stats = recursive_backtracker(&mut g, &mut SequenceChooser::new(vec![0]), &options, &mut recorder)
            .unwrap();

        // (0,0) -> east (1,0) -> south (1,1) -> west (0,1), then backtrack three times
        assert_eq!(g.passages().collect::<Vec<_>>(),
                   vec![(gc(0, 0), gc(1, 0)), (gc(1, 0), gc(1, 1)), (gc(0, 1), gc(1, 1))]);
        assert_eq!(stats.walls_cleared, 3);
        assert_eq!(stats.backtracks, 3);
        assert_eq!(stats.frames_rendered, 7);
        assert_eq!(recorder.len(), 7);
        assert_eq!(recorder.frames()[0].passages_count(), 0);
        assert_eq!(recorder.frames()[0].visited_count(), 1);
        assert_eq!(recorder.last(), Some(&g));
    }

    #[test]
    fn frames_per_mode() {
        let frames_for = |options: GeneratorOptions| {
            let mut g = grid(4, 3);
            let mut recorder = FrameRecorder::new();
            let stats = recursive_backtracker(&mut g, &mut RandomChooser::seeded(5), &options, &mut recorder)
                .unwrap();
            assert_eq!(stats.frames_rendered, recorder.len());
            (stats, recorder)
        };

        let (_, still) = frames_for(GeneratorOptions::default());
        assert_eq!(still.len(), 1);
        assert!(analysis::analyse(&still.frames()[0]).is_perfect());

        let (stats, animated) = frames_for(GeneratorOptionsBuilder::new().animate(true).build());
        assert_eq!(animated.len(), 1 + stats.walls_cleared);

        let (stats, with_backtracks) =
            frames_for(GeneratorOptionsBuilder::new().animate(true).render_backtracks(true).build());
        assert_eq!(with_backtracks.len(), 1 + stats.walls_cleared + stats.backtracks);
    }

    #[test]
    fn walls_stay_symmetric_in_every_frame() {
        let mut g = grid(6, 5);
        let mut recorder = FrameRecorder::new();
        let options = GeneratorOptionsBuilder::new().animate(true).render_backtracks(true).build();
        recursive_backtracker(&mut g, &mut RandomChooser::seeded(11), &options, &mut recorder).unwrap();

        for (index, frame) in recorder.frames().iter().enumerate() {
            let report = analysis::analyse(frame);
            assert!(report.symmetric, "asymmetric walls in frame {}", index);
            assert!(report.acyclic, "cycle in frame {}", index);
        }
        // one passage gained per carving frame, walls never grow back
        for pair in recorder.frames().windows(2) {
            assert!(pair[1].passages_count() >= pair[0].passages_count());
            assert!(pair[1].passages_count() - pair[0].passages_count() <= 1);
        }
    }

    #[test]
    fn start_cell_options() {
        let at = GeneratorOptionsBuilder::new().start(StartCell::At(gc(2, 1))).build();
        let (g, stats) = seeded_maze(3, 2, 3, &at);
        assert_eq!(stats.start, Some(gc(2, 1)));
        assert!(analysis::analyse(&g).is_perfect());

        struct Last;
        impl Chooser for Last {
            fn choose(&mut self, len: usize) -> usize {
                len - 1
            }
        }
        let random = GeneratorOptionsBuilder::new().start(StartCell::Random).build();
        let mut g = grid(3, 2);
        let stats = recursive_backtracker(&mut g, &mut Last, &random, &mut NoopRenderer).unwrap();
        assert_eq!(stats.start, Some(gc(2, 1)));
        assert!(analysis::analyse(&g).is_perfect());
    }

    #[test]
    fn invalid_start_leaves_grid_untouched() {
        let mut g = grid(2, 2);
        let options = GeneratorOptionsBuilder::new().start(StartCell::At(gc(5, 5))).build();
        let err = recursive_backtracker(&mut g, &mut RandomChooser::seeded(1), &options, &mut NoopRenderer)
            .unwrap_err();
        match err {
            GenerateError::Grid(ref e) => assert!(matches!(*e.kind(), ErrorKind::OutOfBounds(..))),
            GenerateError::Render(_) => panic!("no rendering should happen"),
        }
        assert_eq!(g, grid(2, 2));
    }

    #[test]
    fn used_grid_is_rejected() {
        let (mut g, _) = seeded_maze(3, 3, 8, &GeneratorOptions::default());
        let before = g.clone();
        let err = recursive_backtracker(&mut g, &mut RandomChooser::seeded(8), &GeneratorOptions::default(),
                                        &mut NoopRenderer)
            .unwrap_err();
        assert!(matches!(err, GenerateError::Grid(ref e) if matches!(*e.kind(), ErrorKind::Configuration(_))));
        assert_eq!(g, before);
    }

    struct FailingRenderer {
        calls: usize,
        fail_on: usize,
    }

    impl Renderer for FailingRenderer {
        type Error = io::Error;

        fn render(&mut self, _: &Grid) -> Result<(), io::Error> {
            self.calls += 1;
            if self.calls == self.fail_on {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "display went away"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn renderer_failures_are_propagated() {
        let mut g = grid(4, 4);
        let mut renderer = FailingRenderer { calls: 0, fail_on: 3 };
        let options = GeneratorOptionsBuilder::new().animate(true).build();
        let err = recursive_backtracker(&mut g, &mut RandomChooser::seeded(4), &options, &mut renderer)
            .unwrap_err();
        match err {
            GenerateError::Render(ref e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            GenerateError::Grid(ref e) => panic!("unexpected grid error {}", e),
        }
        assert_eq!(renderer.calls, 3);
        // stopped after the second carve
        assert_eq!(g.passages_count(), 2);
    }

    #[test]
    fn max_steps_stops_early() {
        let options = GeneratorOptionsBuilder::new().max_steps(Some(3)).build();
        let (g, stats) = seeded_maze(5, 5, 17, &options);
        assert!(!stats.completed);
        assert_eq!(stats.walls_cleared, 3);
        assert_eq!(g.visited_count(), 4);
        assert!(analysis::analyse(&g).symmetric);
    }

    #[test]
    fn max_steps_ignores_backtracking() {
        // 15 carves finish a 4x4 maze, the backtracks on top must not count
        let options = GeneratorOptionsBuilder::new().max_steps(Some(15)).build();
        let (g, stats) = seeded_maze(4, 4, 5, &options);
        assert!(stats.completed);
        assert_eq!(stats.walls_cleared, 15);
        assert!(stats.backtracks > 0);
        assert!(analysis::analyse(&g).is_perfect());
    }

    #[test]
    fn random_walk_carves_a_single_path() {
        let mut g = grid(6, 6);
        let stats = random_walk(&mut g, &mut RandomChooser::seeded(21), &GeneratorOptions::default(),
                                &mut NoopRenderer)
            .unwrap();
        let report = analysis::analyse(&g);
        assert!(stats.completed);
        assert_eq!(stats.backtracks, 0);
        assert_eq!(stats.walls_cleared, stats.cells_visited - 1);
        assert_eq!(report.passages, stats.walls_cleared);
        assert!(report.symmetric && report.acyclic);
        // a path: no cell has more than two openings
        assert!(g.cells().iter().all(|cell| cell.open_count() <= 2));
    }

    #[test]
    fn random_walk_on_a_corridor_covers_it() {
        let mut g = grid(5, 1);
        let stats = random_walk(&mut g, &mut RandomChooser::seeded(0), &GeneratorOptions::default(),
                                &mut NoopRenderer)
            .unwrap();
        assert_eq!(stats.walls_cleared, 4);
        assert!(analysis::analyse(&g).is_perfect());
    }

    #[test]
    fn sequence_chooser_wraps_and_cycles() {
        let mut chooser = SequenceChooser::new(vec![1, 5]);
        assert_eq!(chooser.choose(4), 1);
        assert_eq!(chooser.choose(4), 1);
        assert_eq!(chooser.choose(2), 1);
        assert_eq!(SequenceChooser::new(vec![]).choose(3), 0);
    }

    #[test]
    fn generated_mazes_are_perfect() {
        fn prop(w: u8, h: u8, seed: u64) -> TestResult {
            let (w, h) = (w as usize % 12 + 1, h as usize % 12 + 1);
            let (g, stats) = seeded_maze(w, h, seed, &GeneratorOptions::default());
            let report = analysis::analyse(&g);
            TestResult::from_bool(report.is_perfect() &&
                                  stats.completed &&
                                  stats.walls_cleared == w * h - 1 &&
                                  stats.cells_visited == w * h &&
                                  g.visited_count() == w * h)
        }
        quickcheck(prop as fn(u8, u8, u64) -> TestResult);
    }

    #[test]
    fn same_seed_same_maze() {
        fn prop(w: u8, h: u8, seed: u64) -> bool {
            let (w, h) = (w as usize % 10 + 1, h as usize % 10 + 1);
            let options = GeneratorOptionsBuilder::new().start(StartCell::Random).build();
            seeded_maze(w, h, seed, &options) == seeded_maze(w, h, seed, &options)
        }
        quickcheck(prop as fn(u8, u8, u64) -> bool);
    }
}
