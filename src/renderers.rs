use std::convert::Infallible;
use std::io;
use std::io::Write;

use crate::grid::Grid;
use crate::grid_displays::{BlankDisplay, GridDisplay, VisitedDisplay};

// Move the cursor home and clear the terminal so each frame draws over the last.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Anything that can show a grid. Generators call `render` with a shared
/// borrow of the grid after each step they want displayed.
pub trait Renderer {
    type Error;

    fn render(&mut self, grid: &Grid) -> Result<(), Self::Error>;
}

impl<'a, R: Renderer + ?Sized> Renderer for &'a mut R {
    type Error = R::Error;

    fn render(&mut self, grid: &Grid) -> Result<(), Self::Error> {
        (**self).render(grid)
    }
}

/// Draws nothing.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    type Error = Infallible;

    fn render(&mut self, _: &Grid) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Keeps a snapshot of every frame it is shown.
#[derive(Debug, Default, Clone)]
pub struct FrameRecorder {
    frames: Vec<Grid>,
}

impl FrameRecorder {
    pub fn new() -> FrameRecorder {
        FrameRecorder::default()
    }

    pub fn frames(&self) -> &[Grid] {
        &self.frames
    }

    pub fn last(&self) -> Option<&Grid> {
        self.frames.last()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn into_frames(self) -> Vec<Grid> {
        self.frames
    }
}

impl Renderer for FrameRecorder {
    type Error = Infallible;

    fn render(&mut self, grid: &Grid) -> Result<(), Infallible> {
        self.frames.push(grid.clone());
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    clear_screen: bool,
    show_visited: bool,
}

#[derive(Debug, Default)]
pub struct RenderOptionsBuilder {
    options: RenderOptions,
}

impl RenderOptionsBuilder {
    pub fn new() -> RenderOptionsBuilder {
        RenderOptionsBuilder::default()
    }
    /// Clear the terminal before each frame, for in place animation.
    pub fn clear_screen(mut self, clear_screen: bool) -> Self {
        self.options.clear_screen = clear_screen;
        self
    }
    /// Shade the cells the generator has not reached yet.
    pub fn show_visited(mut self, show_visited: bool) -> Self {
        self.options.show_visited = show_visited;
        self
    }
    pub fn build(self) -> RenderOptions {
        self.options
    }
}

/// Writes each frame as box drawing text.
#[derive(Debug)]
pub struct TextRenderer<W: Write> {
    out: W,
    options: RenderOptions,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, options: RenderOptions) -> TextRenderer<W> {
        TextRenderer { out, options }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_grid<D: GridDisplay>(&mut self, grid: &Grid, display: &D) -> io::Result<()> {
        if self.options.clear_screen {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        write!(self.out, "{}", grid.display_with(display))?;
        self.out.flush()
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    type Error = io::Error;

    fn render(&mut self, grid: &Grid) -> io::Result<()> {
        if self.options.show_visited {
            self.write_grid(grid, &VisitedDisplay)
        } else {
            self.write_grid(grid, &BlankDisplay)
        }
    }
}
