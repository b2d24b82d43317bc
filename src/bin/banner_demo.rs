// Demo host: drives the error banner through a close-click dismissal and a
// full hover/auto-dismiss cycle, the way the surrounding dashboard would.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use marquee::banner::{
    DismissController, SyncOutcome, BANNER_ID, CLOSE_CONTROL_CLASS, SYNC_INTERVAL,
};
use marquee::dom::{DomAdapter, NodeId, PageDom};
use marquee::events::EventKind;
use marquee::store::ClientStore;

struct DemoPage {
    dom: PageDom,
    banner: NodeId,
    close: NodeId,
}

/// Build the page the way the host renders it: the banner starts with the
/// bootstrap `initialHidden` styling class and carries a close button plus
/// the error text paragraphs.
fn render_page() -> DemoPage {
    let mut dom = PageDom::new();
    let banner = dom.insert_element(
        PageDom::ROOT,
        "div",
        Some(BANNER_ID),
        "error-message-div initialHidden",
    );
    let close = dom.insert_element(banner, "button", Some("close-error-div"), CLOSE_CONTROL_CLASS);
    dom.insert_element(banner, "p", Some("error-title"), "error-title");
    dom.insert_element(banner, "p", Some("error-date"), "error-date");
    dom.insert_element(banner, "p", Some("error-content"), "error-content");
    DemoPage { dom, banner, close }
}

/// An error arrived: the host makes the banner visible and re-renders,
/// which also invokes the binder with the new class name.
fn raise_error(page: &mut DemoPage, store: &mut ClientStore, controller: &mut DismissController) {
    store.set_class(BANNER_ID, "error-message-div");
    store.apply_to_dom(&mut page.dom);
    let class_name = page.dom.class_name(page.banner).to_string();
    controller.refresh_banner(&mut page.dom, &class_name);
    info!(%class_name, "banner raised");
}

/// One synchronization tick: pump timers, run the synchronizer, and apply
/// any returned blob as a render pass. Returns whether the banner was
/// hidden on this tick.
fn sync_tick(
    page: &mut DemoPage,
    store: &mut ClientStore,
    controller: &mut DismissController,
    tick: u64,
) -> Result<bool> {
    controller.poll_timers(&page.dom);

    let blob = store.to_json().context("failed to serialize shared state")?;
    match controller
        .sync(tick, &blob)
        .context("synchronization pass failed")?
    {
        SyncOutcome::NoUpdate => Ok(false),
        SyncOutcome::Updated(new_blob) => {
            *store = ClientStore::parse(&new_blob).context("host could not re-parse blob")?;
            store.apply_to_dom(&mut page.dom);
            let class_name = page.dom.class_name(page.banner).to_string();
            controller.refresh_banner(&mut page.dom, &class_name);
            info!(tick, %class_name, "banner hidden");
            Ok(true)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let subscriber_result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();
    if subscriber_result.is_err() {
        // tracing was already initialised; continue silently
    }

    let mut page = render_page();
    let mut store = ClientStore::default();
    store.set_class(BANNER_ID, "error-message-div initialHidden");

    let mut controller = DismissController::new();

    info!("scenario 1: user clicks the close control");
    raise_error(&mut page, &mut store, &mut controller);
    let mut tick = 0u64;
    let click_at = tick + 2;
    loop {
        tokio::time::sleep(SYNC_INTERVAL).await;
        tick += 1;
        if tick == click_at {
            info!("click on close control");
            controller.handle_event(&page.dom, page.close, EventKind::Click);
        }
        if sync_tick(&mut page, &mut store, &mut controller, tick)? {
            break;
        }
    }

    info!("scenario 2: hover holds the banner, then it times out");
    raise_error(&mut page, &mut store, &mut controller);
    let hover_enter_at = tick + 2;
    let hover_leave_at = tick + 4;
    loop {
        tokio::time::sleep(SYNC_INTERVAL).await;
        tick += 1;
        if tick == hover_enter_at {
            info!("pointer enters the banner, countdown paused");
            controller.handle_event(&page.dom, page.banner, EventKind::PointerEnter);
        }
        if tick == hover_leave_at {
            info!("pointer leaves the banner, countdown restarted");
            controller.handle_event(&page.dom, page.banner, EventKind::PointerLeave);
        }
        if sync_tick(&mut page, &mut store, &mut controller, tick)? {
            break;
        }
    }

    info!(
        "final shared state: {}",
        store.to_json().context("failed to serialize shared state")?
    );
    Ok(())
}
