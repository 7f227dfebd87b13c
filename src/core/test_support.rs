//=========================================================================
// Test Support
//=========================================================================
//
// Recording mocks for the scene, painter and canvas object collaborators.
// Mocks share their state behind `Arc<Mutex<_>>` so a test can keep a
// clone for inspection after moving the original into the dispatch loop.
//
//=========================================================================

use std::sync::{Arc, Mutex};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::core::geometry::{Position, Size};
use crate::core::gesture::{DragEvent, PointEvent};
use crate::core::input::KeyEvent;
use crate::core::scene::{
    same_object, CanvasObject, Capabilities, Hit, Layer, ObjectRef, Painter, Scene,
};
use crate::core::settings::ThemeVariant;

//=== MockObject ==========================================================

pub(crate) struct MockObject {
    name: &'static str,
    capabilities: Capabilities,
    position: Mutex<Position>,
    accepts_tab: Mutex<bool>,
    events: Mutex<Vec<String>>,
}

impl MockObject {
    pub(crate) fn new(name: &'static str, capabilities: Capabilities) -> Arc<Self> {
        Arc::new(Self {
            name,
            capabilities,
            position: Mutex::new(Position::ZERO),
            accepts_tab: Mutex::new(false),
            events: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn set_position(&self, position: Position) {
        *self.position.lock().unwrap() = position;
    }

    pub(crate) fn set_accepts_tab(&self, accepts: bool) {
        *self.accepts_tab.lock().unwrap() = accepts;
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }
}

impl CanvasObject for MockObject {
    fn position(&self) -> Position {
        *self.position.lock().unwrap()
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn touch_down(&self, _event: &PointEvent) {
        self.record("touch_down");
    }

    fn touch_up(&self, _event: &PointEvent) {
        self.record("touch_up");
    }

    fn touch_cancel(&self, _event: &PointEvent) {
        self.record("touch_cancel");
    }

    fn tapped(&self, event: &PointEvent) {
        self.record(format!("tapped@{},{}", event.position.x, event.position.y));
    }

    fn tapped_secondary(&self, _event: &PointEvent) {
        self.record("tapped_secondary");
    }

    fn double_tapped(&self, _event: &PointEvent) {
        self.record("double_tapped");
    }

    fn dragged(&self, _event: &DragEvent) {
        self.record("dragged");
    }

    fn drag_end(&self) {
        self.record("drag_end");
    }

    fn typed_key(&self, event: &KeyEvent) {
        self.record(format!("typed_key:{:?}", event.name));
    }

    fn typed_rune(&self, rune: char) {
        self.record(format!("typed_rune:{}", rune));
    }

    fn accepts_tab(&self) -> bool {
        *self.accepts_tab.lock().unwrap()
    }
}

//=== MockScene ===========================================================

struct Entry {
    object: ObjectRef,
    size: Size,
    layer: Layer,
}

#[derive(Default)]
struct SceneState {
    entries: Vec<Entry>,
    focused: Option<ObjectRef>,
    dirty: bool,
    focus_moves: Vec<&'static str>,
    resized: Vec<Size>,
    safe_areas: Vec<(Position, Size)>,
    themes: Vec<ThemeVariant>,
}

/// Rectangle-based scene. Later entries sit on top of earlier ones within
/// a layer; overlays sit above chrome, chrome above content.
#[derive(Clone, Default)]
pub(crate) struct MockScene {
    state: Arc<Mutex<SceneState>>,
}

impl MockScene {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a 100x100 content object.
    pub(crate) fn add(&self, object: ObjectRef) {
        self.add_layered(object, 100.0, 100.0, Layer::Content);
    }

    pub(crate) fn add_sized(&self, object: ObjectRef, width: f32, height: f32) {
        self.add_layered(object, width, height, Layer::Content);
    }

    pub(crate) fn add_layered(&self, object: ObjectRef, width: f32, height: f32, layer: Layer) {
        self.state.lock().unwrap().entries.push(Entry {
            object,
            size: Size::new(width, height),
            layer,
        });
    }

    /// Removes every object, including the focused one.
    pub(crate) fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.entries.clear();
        state.focused = None;
    }

    pub(crate) fn focus_moves(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().focus_moves.clone()
    }

    pub(crate) fn resized(&self) -> Vec<Size> {
        self.state.lock().unwrap().resized.clone()
    }

    pub(crate) fn safe_areas(&self) -> Vec<(Position, Size)> {
        self.state.lock().unwrap().safe_areas.clone()
    }

    pub(crate) fn themes(&self) -> Vec<ThemeVariant> {
        self.state.lock().unwrap().themes.clone()
    }
}

impl Scene for MockScene {
    fn hit_test(
        &self,
        position: Position,
        matches: &dyn Fn(&dyn CanvasObject) -> bool,
    ) -> Option<Hit> {
        let state = self.state.lock().unwrap();

        [Layer::Overlay, Layer::Chrome, Layer::Content]
            .into_iter()
            .find_map(|layer| {
                state
                    .entries
                    .iter()
                    .rev()
                    .filter(|entry| entry.layer == layer)
                    .find_map(|entry| {
                        let origin = entry.object.position();
                        let inside = position.x >= origin.x
                            && position.y >= origin.y
                            && position.x < origin.x + entry.size.width
                            && position.y < origin.y + entry.size.height;
                        (inside && matches(entry.object.as_ref())).then(|| Hit {
                            object: Arc::clone(&entry.object),
                            local_position: position - origin,
                            layer,
                        })
                    })
            })
    }

    fn focus(&mut self, object: &ObjectRef) {
        self.state.lock().unwrap().focused = Some(Arc::clone(object));
    }

    fn unfocus(&mut self) {
        self.state.lock().unwrap().focused = None;
    }

    fn focused(&self) -> Option<ObjectRef> {
        self.state.lock().unwrap().focused.clone()
    }

    fn focus_next(&mut self) {
        self.state.lock().unwrap().focus_moves.push("next");
    }

    fn focus_previous(&mut self) {
        self.state.lock().unwrap().focus_moves.push("previous");
    }

    fn mark_dirty(&mut self) {
        self.state.lock().unwrap().dirty = true;
    }

    fn check_dirty_and_clear(&mut self) -> bool {
        std::mem::take(&mut self.state.lock().unwrap().dirty)
    }

    fn resize(&mut self, size: Size) {
        self.state.lock().unwrap().resized.push(size);
    }

    fn set_safe_area(&mut self, origin: Position, size: Size) {
        self.state.lock().unwrap().safe_areas.push((origin, size));
    }

    fn walk(&self, visit: &mut dyn FnMut(&ObjectRef, Position)) {
        let objects: Vec<ObjectRef> = self
            .state
            .lock()
            .unwrap()
            .entries
            .iter()
            .map(|entry| Arc::clone(&entry.object))
            .collect();

        for object in &objects {
            visit(object, object.position());
        }
    }

    fn apply_theme(&mut self, variant: ThemeVariant) {
        self.state.lock().unwrap().themes.push(variant);
    }
}

//=== MockPainter =========================================================

/// Painter that records calls and signals every published frame.
#[derive(Clone)]
pub(crate) struct MockPainter {
    log: Arc<Mutex<Vec<String>>>,
    frames_tx: Sender<()>,
    frames_rx: Receiver<()>,
}

impl MockPainter {
    pub(crate) fn new() -> Self {
        let (frames_tx, frames_rx) = unbounded();
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            frames_tx,
            frames_rx,
        }
    }

    pub(crate) fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Receives one message per published frame.
    pub(crate) fn frames(&self) -> Receiver<()> {
        self.frames_rx.clone()
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

impl Painter for MockPainter {
    fn init(&mut self) {
        self.record("init".into());
    }

    fn paint(&mut self, _object: &ObjectRef, position: Position, frame: Size) {
        self.record(format!(
            "paint@{},{} in {}x{}",
            position.x, position.y, frame.width, frame.height
        ));
    }

    fn publish(&mut self) {
        self.record("publish".into());
        let _ = self.frames_tx.send(());
    }

    fn clear_caches(&mut self) {
        self.record("clear_caches".into());
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_test_prefers_chrome_over_content() {
        let content = MockObject::new("content", Capabilities::TAPPABLE);
        let menu = MockObject::new("menu", Capabilities::TAPPABLE);
        let scene = MockScene::new();
        scene.add(content.clone());
        scene.add_layered(menu.clone(), 50.0, 50.0, Layer::Chrome);

        let hit = scene
            .hit_test(Position::new(10.0, 10.0), &|_: &dyn CanvasObject| true)
            .expect("something is hit");

        assert!(same_object(&hit.object, &(menu as ObjectRef)));
        assert_eq!(hit.layer, Layer::Chrome);
        assert_eq!(content.name(), "content");
    }

    #[test]
    fn hit_test_applies_predicate() {
        let label = MockObject::new("label", Capabilities::empty());
        let scene = MockScene::new();
        scene.add(label);

        let hit = scene.hit_test(Position::new(1.0, 1.0), &|obj: &dyn CanvasObject| {
            obj.capabilities().contains(Capabilities::TAPPABLE)
        });

        assert!(hit.is_none());
    }
}
