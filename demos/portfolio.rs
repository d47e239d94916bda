//! Portfolio Demo - Every effect on one page, driven from the terminal
//!
//! Builds a small portfolio page, mounts all effects with `init_page`, and
//! feeds real terminal input into it:
//! - Left/Right arrows move the carousels
//! - j/k (or the mouse wheel) scroll the page, Home/End jump to either end
//! - 1-4 click the nav links (about, services, project, contact)
//! - q, Esc or Ctrl+C exit
//!
//! A status line shows the scroll offset, carousel positions and the
//! typewriter text. Pass a TOML file to override the defaults.
//!
//! Run with: RUST_LOG=pagefx=debug cargo run --example portfolio 2>pagefx.log

use std::cell::Cell;
use std::io::{Write, stdout};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::cursor::MoveToColumn;
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::queue;
use pagefx::state::input::{self, InputEvent};
use pagefx::state::{keyboard, pointer, scroll, timers};
use pagefx::{ElementBuilder, PageConfig, PageHandle, body, dom, init_page};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const NAV_TARGETS: [&str; 4] = ["about", "services", "project", "contact"];

fn build_page() -> Vec<usize> {
    let root = body();

    let nav = ElementBuilder::new("nav")
        .height(64.0)
        .children(NAV_TARGETS.map(|name| ElementBuilder::new("a").attr("href", format!("#{name}"))))
        .mount(root);

    ElementBuilder::new("section")
        .classes("hero scale-on-scroll")
        .height(720.0)
        .child(ElementBuilder::new("h1").child(ElementBuilder::new("span").class("webdev")))
        .child(ElementBuilder::new("div").class("orbit").attr("data-parallax", "0.4"))
        .child(ElementBuilder::new("div").class("orbit").attr("data-parallax", "0.8"))
        .mount(root);

    ElementBuilder::new("section")
        .id("about")
        .height(960.0)
        .children([("Rust", "95%"), ("TypeScript", "80%"), ("SQL", "70%")].map(|(skill, width)| {
            ElementBuilder::new("div")
                .class("skill-progress")
                .attr("data-skill", skill)
                .attr("data-width", width)
                .height(24.0)
        }))
        .mount(root);

    ElementBuilder::new("section")
        .id("services")
        .class("scale-on-scroll")
        .height(800.0)
        .mount(root);

    ElementBuilder::new("section")
        .id("project")
        .children([4, 3].map(|panels| {
            ElementBuilder::new("div")
                .class("project-card")
                .child(
                    ElementBuilder::new("div")
                        .class("slider-wrapper")
                        .child(ElementBuilder::new("div").class("slider-container").children(
                            (0..panels).map(|_| ElementBuilder::new("div").class("slider-item").height(320.0)),
                        ))
                        .child(ElementBuilder::new("button").classes("slider-btn prev"))
                        .child(ElementBuilder::new("button").classes("slider-btn next")),
                )
                .child(ElementBuilder::new("div").class("slider-dots"))
        }))
        .mount(root);

    ElementBuilder::new("section").id("contact").height(640.0).mount(root);

    dom::children_of(nav)
}

fn status_line(page: &PageHandle) -> String {
    let slides: Vec<String> = page
        .carousels()
        .iter()
        .map(|c| match c.current_index() {
            Some(i) => format!("{}/{}", i + 1, c.slide_count()),
            None => "-".to_string(),
        })
        .collect();
    let typed = page.typewriter().map(|t| t.text()).unwrap_or_default();
    let animated = dom::query_selector_all(body(), ".skill-progress.animate")
        .map(|bars| bars.len())
        .unwrap_or(0);

    format!(
        "scroll {:>6.0}/{:<6.0} | slides [{}] | skills animated {} | {}▏",
        scroll::scroll_y(),
        scroll::max_scroll(),
        slides.join(" "),
        animated,
        typed
    )
}

fn run(page: &PageHandle, links: &[usize]) -> std::io::Result<()> {
    let quit = Rc::new(Cell::new(false));

    let quit_for_keys = quit.clone();
    let _quit = keyboard::on(move |event| {
        let exit = event.key == "q" || event.key == "Escape" || (event.modifiers.ctrl && event.key == "c");
        if exit {
            quit_for_keys.set(true);
        }
        exit
    });
    let _down = keyboard::on_key("j", || scroll::scroll_by(input::WHEEL_ROWS * input::CELL_HEIGHT_PX));
    let _up = keyboard::on_key("k", || scroll::scroll_by(-input::WHEEL_ROWS * input::CELL_HEIGHT_PX));
    let _top = keyboard::on_key("Home", scroll::scroll_to_top);
    let _bottom = keyboard::on_key("End", scroll::scroll_to_bottom);

    let links = links.to_vec();
    let _nav = keyboard::on(move |event| {
        let Some(slot) = event.key.parse::<usize>().ok().filter(|n| (1..=links.len()).contains(n)) else {
            return false;
        };
        pointer::click(links[slot - 1]);
        true
    });

    let started = Instant::now();
    let mut out = stdout();
    while !quit.get() {
        if let Some(event) = input::poll_event(Duration::from_millis(16))? {
            input::route_event(event);
        }

        // Keep the virtual clock on wall time
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        timers::advance(Duration::from_millis(elapsed.saturating_sub(timers::now())));

        queue!(
            out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(status_line(page))
        )?;
        out.flush()?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "pagefx=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PageConfig::load(path)?,
        None => PageConfig::default(),
    };

    let links = build_page();
    let (columns, rows) = terminal::size()?;
    input::route_event(InputEvent::Resize(columns, rows));

    let page = init_page(&config);

    terminal::enable_raw_mode()?;
    input::enable_mouse()?;
    let result = run(&page, &links);
    input::disable_mouse()?;
    terminal::disable_raw_mode()?;

    page.teardown();
    println!();
    result?;
    Ok(())
}
