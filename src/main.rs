//! softgui demo
//!
//! Builds a small form (label, text field, two buttons) in a headless window,
//! feeds it a few scripted input events, and optionally saves a screenshot.
//!
//! Usage:
//!   softgui-demo                         # 60 ticks, print the tree
//!   softgui-demo --type "hi" --click     # type into the field, press OK
//!   softgui-demo -s shot.png             # save the final frame

use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use softgui::event::{PlatformEvent, KEY_TAB};
use softgui::widget::{
    Align, Button, ButtonArgs, Field, FieldArgs, Label, LabelArgs, Orientation, Packer, PackerArgs,
};
use softgui::{Context, GuiConfig, HeadlessPlatform, WidgetArgs, WidgetId};

#[derive(Parser)]
#[command(name = "softgui-demo")]
#[command(about = "Headless demo of the softgui widget toolkit")]
struct Cli {
    #[arg(long, default_value_t = 320)]
    width: i32,

    #[arg(long, default_value_t = 120)]
    height: i32,

    /// Number of update ticks to run
    #[arg(short, long, default_value_t = 60)]
    ticks: u32,

    /// Text typed into the field after startup
    #[arg(long = "type")]
    text: Option<String>,

    /// Click the OK button
    #[arg(long)]
    click: bool,

    /// Write the final frame as PNG
    #[arg(short, long)]
    screenshot: Option<PathBuf>,

    /// Config file (defaults to the user config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip printing the widget tree
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GuiConfig::load_from(path)?,
        None => GuiConfig::load(),
    };

    let platform = HeadlessPlatform::new(cli.width, cli.height)?;
    let handle = platform.handle();
    let mut ctx = Context::new(platform, config)?;

    let root = ctx.create_root::<Packer>(WidgetArgs::Packer(PackerArgs {
        orientation: Orientation::Column,
        major: Align::Start,
        minor: Align::Fill,
        spacing: 4,
        ..Default::default()
    }))?;
    if let Some(node) = ctx.widget_mut(root) {
        node.padx = 6;
        node.pady = 6;
        node.bgcolor = 0xe0e0e0ff;
    }

    let status = ctx.spawn::<Label>(root, WidgetArgs::Label(LabelArgs {
        text: "Ready".into(),
        ..Default::default()
    }))?;
    let field = ctx.spawn::<Field>(root, WidgetArgs::Field(FieldArgs::default()))?;
    let row = ctx.spawn::<Packer>(root, WidgetArgs::Packer(PackerArgs {
        orientation: Orientation::Row,
        major: Align::End,
        spacing: 6,
        ..Default::default()
    }))?;

    let ok = ctx.spawn::<Button>(row, WidgetArgs::Button(ButtonArgs {
        text: "OK".into(),
        on_click: Some(Rc::new(move |ctx: &mut Context, _: WidgetId| {
            let text = Field::text(ctx, field).unwrap_or_default();
            let msg = format!("Entered: {}", String::from_utf8_lossy(&text));
            if let Err(e) = Label::set_text(ctx, status, msg) {
                tracing::warn!("status update failed: {}", e);
            }
        })),
        ..Default::default()
    }))?;
    ctx.spawn::<Button>(row, WidgetArgs::Button(ButtonArgs {
        text: "Quit".into(),
        on_click: Some(Rc::new(|ctx: &mut Context, _: WidgetId| ctx.terminate_soon(0))),
        ..Default::default()
    }))?;

    let dt = 1.0 / ctx.config().effective_rate();
    ctx.tick(dt)?;

    if let Some(text) = &cli.text {
        for ch in text.chars() {
            handle.push_event(PlatformEvent::Key { keycode: 0, pressed: true, codepoint: ch as u32 });
            handle.push_event(PlatformEvent::Key { keycode: 0, pressed: false, codepoint: 0 });
        }
        // Field is first in the ring; Tab moves on to OK.
        handle.push_event(PlatformEvent::Key { keycode: KEY_TAB, pressed: true, codepoint: 0x09 });
        ctx.tick(dt)?;
    }

    if cli.click {
        let (x, y) = ctx.tree().global_from_local(ok, 2, 2);
        handle.push_event(PlatformEvent::Motion { x, y });
        handle.push_event(PlatformEvent::Button { button: 1, pressed: true });
        handle.push_event(PlatformEvent::Button { button: 1, pressed: false });
    }

    for _ in 0..cli.ticks {
        if ctx.termination_status().is_some() {
            break;
        }
        ctx.tick(dt)?;
    }

    if !cli.quiet {
        softgui::dump::print_tree(&ctx);
    }
    if let Some(path) = &cli.screenshot {
        handle.screenshot().save(path)?;
        println!("Saved {}", path.display());
    }
    Ok(())
}
