// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless viewport stippling.
//!
//! Maps a pan/zoom view of the unit square onto a clip box and a rank limit
//! that keeps roughly one dot per `px_per_dot` square pixels on screen, then
//! queries the tile set for every frame of a zoom animation. Optionally draws
//! the last frame as text.
//!
//! Run:
//! - `cargo run -p understory_demos --example viewport_stipple`
//! - `cargo run -p understory_demos --example viewport_stipple -- --frames 40 --zoom-ratio 1.25 --ascii 100`
//! - `RUST_LOG=debug cargo run -p understory_demos --example viewport_stipple -- tiles.dat`

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use kurbo::{Point, Size, Vec2};
use understory_blue_noise::{BoundingBox, PointBatch, QueryError, TileSet};
use understory_demos::{TileSetArgs, init_tracing};

const PX_PER_DOT: f64 = 30.0;
const UNIT_SIZE_PX: f64 = 500.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 1.0e6;

#[derive(Parser, Debug)]
#[command(about = "Query a tile set the way an interactive pan/zoom view would")]
struct Cli {
    #[command(flatten)]
    source: TileSetArgs,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 600.0)]
    width: f64,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Initial zoom factor.
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Screen pixels per dot; lower means denser stippling.
    #[arg(long, default_value_t = PX_PER_DOT)]
    px_per_dot: f64,

    /// Pixels the unit square spans at zoom 1.
    #[arg(long, default_value_t = UNIT_SIZE_PX)]
    unit_size_px: f64,

    /// Number of frames to query.
    #[arg(long, default_value_t = 12)]
    frames: u32,

    /// Zoom ratio applied between frames, anchored at `--focus-x/--focus-y`.
    #[arg(long, default_value_t = 1.5)]
    zoom_ratio: f64,

    /// Horizontal zoom anchor in screen pixels.
    #[arg(long)]
    focus_x: Option<f64>,

    /// Vertical zoom anchor in screen pixels.
    #[arg(long)]
    focus_y: Option<f64>,

    /// Draw the last frame as text this many columns wide.
    #[arg(long)]
    ascii: Option<usize>,
}

/// Pan/zoom state of a screen looking at the unit square.
#[derive(Clone, Copy, Debug)]
struct Viewport {
    size: Size,
    zoom: f64,
    offset: Vec2,
    unit_size_px: f64,
    px_per_dot: f64,
}

impl Viewport {
    fn unit_to_px(&self) -> f64 {
        self.zoom * self.unit_size_px
    }

    /// The visible part of the domain. The unit square sits centered on screen
    /// at zero offset.
    fn clip(&self) -> BoundingBox {
        let scale = self.unit_to_px();
        let w = self.size.width / scale;
        let h = self.size.height / scale;
        let x = -self.offset.x / scale - 0.5 * w + 0.5;
        let y = -self.offset.y / scale - 0.5 * h + 0.5;
        BoundingBox::from_xywh(x, y, w, h)
    }

    /// Rank limit for one dot per `px_per_dot` square pixels.
    fn max_rank(&self) -> f64 {
        self.unit_to_px().powi(2) / self.px_per_dot
    }

    /// Zoom by `ratio` keeping the domain point under `pos` fixed on screen.
    fn zoom_at(&mut self, pos: Point, ratio: f64) {
        let mouse = pos.to_vec2() - 0.5 * self.size.to_vec2();
        let anchor = (mouse - self.offset) / self.zoom;
        self.zoom = (self.zoom * ratio).clamp(MIN_ZOOM, MAX_ZOOM);
        self.offset = if self.zoom < 1.0 {
            Vec2::ZERO
        } else {
            mouse - anchor * self.zoom
        };
    }

    fn to_screen(&self, p: Point) -> Point {
        let origin = self.clip();
        let scale = self.unit_to_px();
        Point::new((p.x - origin.min_x) * scale, (p.y - origin.min_y) * scale)
    }
}

struct Frame {
    batches: Vec<PointBatch>,
    points: usize,
}

fn query_frame(set: &TileSet, view: &Viewport) -> Result<Frame, QueryError> {
    let clip = view.clip();
    let max_rank = view.max_rank();
    let start = Instant::now();
    let batches = set.query(clip, max_rank).collect_batches()?;
    let elapsed = start.elapsed();
    let points = batches.iter().map(PointBatch::len).sum();
    let deepest = batches.iter().map(|b| b.level).max().unwrap_or(0);
    tracing::info!(
        zoom = format_args!("{:.1}", view.zoom),
        points,
        tiles = batches.len(),
        deepest,
        micros = elapsed.as_micros() as u64,
        "frame"
    );
    tracing::debug!(?clip, max_rank, "query parameters");
    Ok(Frame { batches, points })
}

fn draw_ascii(view: &Viewport, frame: &Frame, cols: usize) {
    // Terminal cells are about twice as tall as wide.
    let cols = cols.max(1);
    let cell = view.size.width / cols as f64;
    let rows = ((view.size.height / (2.0 * cell)).ceil() as usize).max(1);
    let mut grid = vec![0_u32; cols * rows];
    for batch in &frame.batches {
        for p in &batch.points {
            let s = view.to_screen(*p);
            let c = (s.x / cell) as usize;
            let r = (s.y / (2.0 * cell)) as usize;
            if c < cols && r < rows {
                grid[r * cols + c] += 1;
            }
        }
    }
    const RAMP: &[u8] = b" .:-=+*#%@";
    for row in grid.chunks(cols) {
        let line: String = row
            .iter()
            .map(|&n| RAMP[(n as usize).min(RAMP.len() - 1)] as char)
            .collect();
        println!("{line}");
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let set = match cli.source.load() {
        Ok(set) => set,
        Err(err) => {
            tracing::error!(%err, "failed to load tile set");
            return ExitCode::FAILURE;
        }
    };

    let mut view = Viewport {
        size: Size::new(cli.width, cli.height),
        zoom: cli.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        offset: Vec2::ZERO,
        unit_size_px: cli.unit_size_px,
        px_per_dot: cli.px_per_dot,
    };
    let focus = Point::new(
        cli.focus_x.unwrap_or(0.5 * cli.width),
        cli.focus_y.unwrap_or(0.5 * cli.height),
    );

    let mut last = None;
    let mut total_points = 0;
    let start = Instant::now();
    for i in 0..cli.frames {
        if i > 0 {
            view.zoom_at(focus, cli.zoom_ratio);
        }
        match query_frame(&set, &view) {
            Ok(frame) => {
                total_points += frame.points;
                last = Some(frame);
            }
            Err(err) => {
                tracing::error!(%err, frame = i, "query failed");
                return ExitCode::FAILURE;
            }
        }
    }
    tracing::info!(
        frames = cli.frames,
        total_points,
        millis = start.elapsed().as_millis() as u64,
        "done"
    );

    if let (Some(cols), Some(frame)) = (cli.ascii, &last) {
        draw_ascii(&view, frame, cols);
    }
    ExitCode::SUCCESS
}
