//! Browser runtime
//!
//! Mounts the game named by the URL hash (`#snake`, `#2048`, ...) onto the
//! `#canvas` element, wires keyboard and pointer listeners into the driver's
//! input state and runs the driver from `requestAnimationFrame`.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, Response};

use crate::audio::{TonePlayer, WebAudio};
use crate::consts::FRAME_DT;
use crate::driver::LoopDriver;
use crate::error::FetchError;
use crate::games::typing::{WordInbox, WordSource};
use crate::games::{self, GameKind};
use crate::input::ListenerGuard;
use crate::persistence::{KeyValueStore, LocalStore, MemoryStore};
use crate::renderer::CanvasSurface;
use crate::settings::Settings;

pub const WORD_URL: &str = "https://random-word-api.herokuapp.com/word";

/// Keys whose default browser action (scrolling) is suppressed
const CAPTURED_KEYS: &[&str] = &["ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight", " "];

/// Fetches one random word per request
#[derive(Debug, Default)]
pub struct HttpWordSource;

impl HttpWordSource {
    pub fn new() -> Self {
        Self
    }
}

impl WordSource for HttpWordSource {
    fn request(&mut self, inbox: &WordInbox) {
        let ticket = inbox.ticket();
        spawn_local(async move {
            let result = fetch_word().await;
            if let Err(e) = &result {
                log::warn!("Word fetch failed: {e}");
            }
            ticket.deliver(result);
        });
    }
}

async fn fetch_word() -> Result<String, FetchError> {
    let network = |e: JsValue| FetchError::Network(format!("{e:?}"));
    let window = web_sys::window().ok_or_else(|| FetchError::Network("no window".into()))?;
    let response: Response = JsFuture::from(window.fetch_with_str(WORD_URL))
        .await
        .map_err(network)?
        .dyn_into()
        .map_err(|_| FetchError::BadBody)?;
    if !response.ok() {
        return Err(FetchError::Status(response.status()));
    }
    let body = JsFuture::from(response.text().map_err(network)?)
        .await
        .map_err(network)?
        .as_string()
        .ok_or(FetchError::BadBody)?;
    let words: Vec<String> = serde_json::from_str(&body).map_err(|_| FetchError::BadBody)?;
    words.into_iter().next().ok_or(FetchError::BadBody)
}

/// Everything one mounted game needs between frames
struct Session {
    driver: LoopDriver,
    surface: CanvasSurface,
    last_time: Option<f64>,
}

/// A registered DOM listener, kept alive until removed
struct Registration {
    target: EventTarget,
    event: &'static str,
    handler: Closure<dyn FnMut(web_sys::Event)>,
}

fn listen(
    target: &EventTarget,
    event: &'static str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<Registration, JsValue> {
    let handler = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    target.add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())?;
    Ok(Registration {
        target: target.clone(),
        event,
        handler,
    })
}

/// Game selected by the location hash; Snake when absent or unknown
fn selected_game(window: &web_sys::Window) -> GameKind {
    let hash = window.location().hash().unwrap_or_default();
    let slug = hash.trim_start_matches('#');
    if slug.is_empty() {
        return GameKind::Snake;
    }
    slug.parse().unwrap_or_else(|e| {
        log::warn!("{e}, falling back to Snake");
        GameKind::Snake
    })
}

/// Mount the selected game and start its loop
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id("canvas")
        .ok_or("no #canvas element")?
        .dyn_into()?;

    let store: Box<dyn KeyValueStore> = match LocalStore::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("{e}; high scores will not persist");
            Box::new(MemoryStore::new())
        }
    };
    let settings = Settings::load(store.as_ref());

    let kind = selected_game(&window);
    let (width, height) = kind.surface_size();
    let mut surface =
        CanvasSurface::new(canvas.clone()).map_err(|e| JsValue::from_str(&e.to_string()))?;
    surface.resize(width, height);

    let mut audio = WebAudio::new();
    audio.set_volume(settings.master_volume, settings.sfx_volume, settings.muted);

    let seed = js_sys::Date::now() as u64;
    log::info!("Mounting {} with seed {seed}", kind.title());
    let driver = LoopDriver::new(games::create(kind, seed, &settings))
        .with_max_substeps(settings.max_substeps)
        .with_audio(Box::new(audio))
        .with_store(store);

    let session = Rc::new(RefCell::new(Session {
        driver,
        surface,
        last_time: None,
    }));
    let guard = register_listeners(&window, &canvas, &session)?;
    {
        let mut s = session.borrow_mut();
        s.driver.attach_listeners(guard);
        s.driver.start();
    }
    schedule_frame(session);
    Ok(())
}

fn register_listeners(
    window: &web_sys::Window,
    canvas: &HtmlCanvasElement,
    session: &Rc<RefCell<Session>>,
) -> Result<ListenerGuard, JsValue> {
    let mut registrations = Vec::new();

    let s = Rc::clone(session);
    registrations.push(listen(window, "keydown", move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let key = event.key();
        if CAPTURED_KEYS.contains(&key.as_str()) {
            event.prevent_default();
        }
        s.borrow_mut().driver.input_mut().dom_key_down(&key);
    })?);

    let s = Rc::clone(session);
    registrations.push(listen(window, "keyup", move |event| {
        if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
            s.borrow_mut().driver.input_mut().dom_key_up(&event.key());
        }
    })?);

    let s = Rc::clone(session);
    registrations.push(listen(window, "blur", move |_| {
        s.borrow_mut().driver.input_mut().release_all();
    })?);

    let s = Rc::clone(session);
    registrations.push(listen(canvas, "mousemove", move |event| {
        if let Some(event) = event.dyn_ref::<MouseEvent>() {
            let at = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
            s.borrow_mut().driver.input_mut().pointer_move(at);
        }
    })?);

    let s = Rc::clone(session);
    registrations.push(listen(canvas, "mousedown", move |event| {
        if let Some(event) = event.dyn_ref::<MouseEvent>() {
            let at = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
            s.borrow_mut().driver.input_mut().click(at);
        }
    })?);

    log::debug!("Registered {} listeners", registrations.len());
    Ok(ListenerGuard::new(move || {
        for reg in registrations {
            let removed = reg
                .target
                .remove_event_listener_with_callback(
                    reg.event,
                    reg.handler.as_ref().unchecked_ref(),
                );
            if let Err(e) = removed {
                log::warn!("Could not remove {} listener: {e:?}", reg.event);
            }
        }
    }))
}

fn schedule_frame(session: Rc<RefCell<Session>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(move |time: f64| frame(session, time));
    if let Err(e) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        log::error!("requestAnimationFrame failed: {e:?}");
    }
    closure.forget();
}

fn frame(session: Rc<RefCell<Session>>, time: f64) {
    {
        let mut s = session.borrow_mut();
        let elapsed = s
            .last_time
            .map_or(FRAME_DT, |last| ((time - last) / 1000.0) as f32);
        s.last_time = Some(time);

        let Session { driver, surface, .. } = &mut *s;
        driver.advance(elapsed, surface);
        if let Some(result) = driver.take_finished() {
            let best = if result.new_best { " (new best)" } else { "" };
            log::info!("{} over: {}{best}", result.kind.title(), result.score);
        }
        if !driver.is_running() {
            return;
        }
    }
    schedule_frame(session);
}
