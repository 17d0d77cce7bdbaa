use anyhow::{Context, bail};
use biofx::config::{self, Config};
use biofx::effect::{EffectConfig, EffectType, Engine};
use biofx::external::{self, FeedSource};
use biofx::host::{EffectHost, Layer};
use biofx::render::{Canvas, ColorMode};
use biofx::surface::{Recorder, Surface, Viewport};
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, terminal,
};
use std::io::{self, BufWriter, Write};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

/// CSS pixels per terminal pixel in the preview.
const PX_PER_CELL: f64 = 4.0;

#[derive(Parser)]
#[command(
    name = "biofx",
    version,
    about = "Preview link-in-bio background effects in the terminal"
)]
struct Cli {
    /// Effect id (use --list to see all)
    effect: Option<String>,

    /// Base tint, #RGB or #RRGGBB
    #[arg(long)]
    color: Option<String>,

    /// Global opacity (0-1)
    #[arg(long)]
    opacity: Option<f64>,

    /// Speed multiplier
    #[arg(long)]
    speed: Option<f64>,

    /// Size multiplier
    #[arg(long)]
    size: Option<f64>,

    /// Custom media data URI (for the `custom` effect)
    #[arg(long)]
    media: Option<String>,

    /// Target FPS (1-120)
    #[arg(short, long)]
    fps: Option<u32>,

    /// List available effects and exit
    #[arg(short, long)]
    list: bool,

    /// Print the HTML layer of a DOM or media effect and exit
    #[arg(long)]
    html: bool,

    /// Print the layer as JSON and exit
    #[arg(long)]
    json: bool,

    /// Color mode
    #[arg(long, value_enum)]
    color_mode: Option<ColorMode>,

    /// Hide the status bar
    #[arg(long)]
    clean: bool,

    /// Follow effect updates: `-` for stdin JSON lines, or a JSON file to watch
    #[arg(long)]
    feed: Option<String>,

    /// Print the config file path and exit
    #[arg(long)]
    show_config: bool,

    /// Write a commented default config file and exit
    #[arg(long)]
    init_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.show_config {
        match config::config_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("no config directory on this platform"),
        }
        return Ok(());
    }

    if cli.init_config {
        let path = config::config_path().context("no config directory on this platform")?;
        config::write_default(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    if cli.list {
        println!("Available effects:");
        for &effect in EffectType::ALL {
            println!(
                "  {:<14} {:<7} {}",
                effect.id(),
                format!("{:?}", effect.engine()).to_lowercase(),
                effect.description()
            );
        }
        println!("\nColor modes: mono, ansi16, ansi256, true-color");
        return Ok(());
    }

    let file = config::load_config();
    let effect = effect_config(&cli, &file)?;

    if cli.html || cli.json {
        return print_layer(&effect, cli.json);
    }

    let fps = cli.fps.or(file.fps).unwrap_or(30).clamp(1, 120);
    let color_mode = cli
        .color_mode
        .or(file.color_mode.map(ColorMode::from))
        .unwrap_or(ColorMode::TrueColor);
    let clean = cli.clean || file.clean.unwrap_or(false);
    let feed = cli
        .feed
        .as_deref()
        .map(|arg| external::spawn_reader(FeedSource::from_arg(arg)));

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let mut writer = BufWriter::with_capacity(256 * 1024, stdout);
    let result = run_loop(
        &mut writer,
        effect,
        color_mode,
        clean,
        Duration::from_secs_f64(1.0 / fps as f64),
        feed,
    );

    execute!(writer, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result
}

/// CLI flags over the config file over the built-in defaults.
fn effect_config(cli: &Cli, file: &Config) -> anyhow::Result<EffectConfig> {
    let mut cfg = file.effect_config();
    if let Some(id) = &cli.effect {
        match EffectType::from_id(id) {
            Some(effect) => cfg.effect_type = effect,
            None => bail!("unknown effect '{id}' (use --list to see all)"),
        }
    } else if file.effect.is_none() {
        cfg.effect_type = EffectType::Galaxy;
    }
    if let Some(color) = &cli.color {
        cfg.color = color.clone();
    }
    cfg.opacity = cli.opacity.or(cfg.opacity);
    cfg.speed = cli.speed.or(cfg.speed);
    cfg.size = cli.size.or(cfg.size);
    if let Some(media) = &cli.media {
        cfg.custom_media_url = Some(media.clone());
    }
    Ok(cfg)
}

fn print_layer(effect: &EffectConfig, json: bool) -> anyhow::Result<()> {
    if effect.effect_type.engine() == Engine::Canvas {
        bail!(
            "'{}' is a canvas effect and has no markup; run it without --html/--json",
            effect.effect_type
        );
    }
    let mut host: EffectHost<Recorder> = EffectHost::new(Viewport::default());
    host.configure(effect.clone());
    match host.layer() {
        Layer::Dom(layer) if json => println!("{}", layer.to_json()?),
        Layer::Dom(layer) => println!("{}", layer.document()),
        Layer::Media(media) if json => println!("{}", media.to_json()?),
        Layer::Media(media) => println!("{}", media.html()),
        Layer::Canvas | Layer::Empty => {}
    }
    Ok(())
}

fn viewport_for(cols: u16, rows: usize) -> Viewport {
    Viewport::new(cols as f64 * PX_PER_CELL, rows as f64 * 2.0 * PX_PER_CELL)
}

fn run_loop(
    stdout: &mut BufWriter<io::Stdout>,
    initial: EffectConfig,
    mut color_mode: ColorMode,
    mut hide_status: bool,
    frame_dur: Duration,
    feed: Option<Receiver<biofx::EffectUpdate>>,
) -> anyhow::Result<()> {
    let (mut cols, mut rows) = terminal::size()?;
    let display_rows = |rows: u16, hide: bool| {
        if hide {
            rows as usize
        } else {
            (rows as usize).saturating_sub(1)
        }
    };

    let mut host = EffectHost::new(viewport_for(cols, display_rows(rows, hide_status)));
    host.mount_surface(Canvas::new(
        cols as usize,
        display_rows(rows, hide_status),
        color_mode,
    ));
    host.configure(initial);

    let mut last_frame = Instant::now();
    let mut frame_count: u64 = 0;
    let mut actual_fps: f64 = 0.0;
    let mut fps_update = Instant::now();
    let mut rebuild_canvas = false;

    loop {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Resize(w, h) => {
                    if w >= 10 && h >= 5 {
                        cols = w;
                        rows = h;
                        rebuild_canvas = true;
                    }
                }
                Event::Key(KeyEvent { code, .. }) => match code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Right | KeyCode::Char('n') => step_effect(&mut host, 1),
                    KeyCode::Left | KeyCode::Char('p') => step_effect(&mut host, -1),
                    KeyCode::Char('c') => {
                        color_mode = color_mode.next();
                        if let Some(canvas) = host.surface_mut() {
                            canvas.color_mode = color_mode;
                        }
                    }
                    KeyCode::Char('h') => {
                        hide_status = !hide_status;
                        rebuild_canvas = true;
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        if let Some(rx) = &feed {
            while let Ok(update) = rx.try_recv() {
                if host.update(update) {
                    log::info!("feed switched to {}", host.params().effect);
                }
            }
        }

        if rebuild_canvas {
            let (settled_cols, settled_rows) = terminal::size()?;
            if settled_cols >= 10 && settled_rows >= 5 {
                cols = settled_cols;
                rows = settled_rows;
            }
            let drows = display_rows(rows, hide_status);
            if let Some(canvas) = host.surface_mut() {
                canvas.resize_grid(cols as usize, drows);
            }
            host.resize(viewport_for(cols, drows));
            write!(stdout, "\x1b[2J\x1b[H")?;
            stdout.flush()?;
            rebuild_canvas = false;
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame);
        last_frame = now;
        host.pump(dt);

        let layer = host.layer();
        let viewport = host.viewport();
        if let Some(canvas) = host.surface_mut() {
            match &layer {
                Layer::Canvas => {}
                Layer::Dom(dom) => {
                    canvas.clear();
                    dom.sketch(canvas, viewport);
                }
                Layer::Media(_) | Layer::Empty => canvas.clear(),
            }
        }
        let frame = host.surface().map(Canvas::render).unwrap_or_default();

        let (check_cols, check_rows) = terminal::size()?;
        if check_cols != cols || check_rows != rows {
            cols = check_cols;
            rows = check_rows;
            rebuild_canvas = true;
            std::thread::sleep(Duration::from_millis(50));
            continue;
        }

        stdout.write_all(b"\x1b[H")?;
        stdout.write_all(frame.as_bytes())?;

        frame_count += 1;
        if fps_update.elapsed() >= Duration::from_secs(1) {
            actual_fps = frame_count as f64 / fps_update.elapsed().as_secs_f64();
            frame_count = 0;
            fps_update = Instant::now();
        }
        if !hide_status {
            let status = status_line(&host, &layer, color_mode, actual_fps);
            let w = cols as usize;
            let truncated: String = status.chars().take(w).collect();
            let padded = format!("{:<width$}", truncated, width = w);
            write!(stdout, "\x1b[{};1H\x1b[7m{}\x1b[0m", rows, padded)?;
        }

        stdout.flush()?;

        let elapsed = last_frame.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

/// Move to the next or previous effect in menu order. Each step is a
/// reconfiguration with the same color and numbers.
fn step_effect(host: &mut EffectHost<Canvas>, delta: isize) {
    let all = EffectType::ALL;
    let current = host.config().effect_type;
    let idx = all.iter().position(|&e| e == current).unwrap_or(0) as isize;
    let next = all[(idx + delta).rem_euclid(all.len() as isize) as usize];
    let mut cfg = host.config().clone();
    cfg.effect_type = next;
    host.configure(cfg);
}

fn status_line(host: &EffectHost<Canvas>, layer: &Layer, mode: ColorMode, fps: f64) -> String {
    let params = host.params();
    let detail = match layer {
        Layer::Canvas => format!("{} particles", host.population()),
        Layer::Dom(dom) => format!("{} elements (sketch)", dom.elements.len()),
        Layer::Media(media) => format!("{:?} media, use --html", media.kind),
        Layer::Empty if params.engine() == Engine::Media => "no usable media".to_string(),
        Layer::Empty => "off".to_string(),
    };
    format!(
        " {} | {} | {:?} | {:.0} fps | [←/→] effect  [c] color  [h] hide  [q] quit ",
        params.effect, detail, mode, fps,
    )
}
