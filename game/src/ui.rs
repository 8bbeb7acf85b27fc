//! Scene drawing and clickable layout. Everything is drawn from primitives.

use engine::graphics::{Color, Renderer2d, text_width};
use engine::ui::Rect;
use engine::view_tree::{ButtonNode, TextNode, ViewNode, ViewTree};
use gesture::ActiveGesture;

use crate::level::ObjectKind;
use crate::round::{LevelRound, RoundOutcome};
use crate::state::{GameState, SessionProgress};
use crate::view::GameView;

pub const WINDOW_WIDTH: u32 = 600;
pub const WINDOW_HEIGHT: u32 = 900;

/// Level number and centre of its button on the preparation screen.
pub const LEVEL_BUTTONS: [(u8, (u32, u32)); 4] = [
    (1, (313, 259)),
    (2, (281, 207)),
    (3, (321, 124)),
    (4, (270, 46)),
];

pub const HOVER_RING_RADIUS: u32 = 30;
const BUTTON_RADIUS: u32 = 22;

pub const OBJECT_SIZE: u32 = 48;
pub const ENEMY_POS: (u32, u32) = (200, 100);

const MENU_BUTTON: Rect = Rect {
    x: 510,
    y: 12,
    w: 76,
    h: 26,
};

const MENU_BUTTON_ID: u32 = 100;

const WHITE: Color = [255, 255, 255, 255];
const DIM: Color = [110, 110, 130, 255];
const MENU_BG: Color = [18, 22, 44, 255];
const LEVEL_BG: Color = [34, 14, 22, 255];
const BUTTON_FILL: Color = [196, 150, 60, 255];
const HEALTH_FILL: Color = [70, 200, 90, 255];
const ENEMY_FILL: Color = [210, 60, 60, 255];
const BAR_EMPTY: Color = [50, 50, 60, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    SelectLevel(u8),
    BackToMenu,
}

/// Pointer-sensitive box for a level button: 65x37, starting 32 px left of and 18 px above
/// the centre.
pub fn level_hit_box(center: (u32, u32)) -> Rect {
    let (cx, cy) = center;
    Rect::new(cx.saturating_sub(32), cy.saturating_sub(18), 65, 37)
}

/// Level whose button is under `pos`, first match in menu order.
pub fn hovered_level(pos: (u32, u32)) -> Option<u8> {
    LEVEL_BUTTONS
        .iter()
        .find(|(_, center)| level_hit_box(*center).contains(pos.0, pos.1))
        .map(|(n, _)| *n)
}

pub fn build_view_tree(state: &GameState) -> ViewTree<UiAction> {
    let mut tree = ViewTree::new();
    match state.view {
        GameView::Preparation { .. } => {
            for (number, center) in LEVEL_BUTTONS {
                tree.push(ViewNode::Button(ButtonNode {
                    id: u32::from(number),
                    rect: level_hit_box(center),
                    label: format!("LEVEL {number}"),
                    action: UiAction::SelectLevel(number),
                    enabled: true,
                }));
            }
        }
        GameView::Level(number) => {
            tree.push(ViewNode::Text(TextNode {
                pos: (12, 16),
                text: format!("LEVEL {number}"),
            }));
            tree.push(ViewNode::Button(ButtonNode {
                id: MENU_BUTTON_ID,
                rect: MENU_BUTTON,
                label: "MENU".into(),
                action: UiAction::BackToMenu,
                enabled: true,
            }));
        }
    }
    tree
}

pub fn render(state: &GameState, view: &ViewTree<UiAction>, gfx: &mut dyn Renderer2d) {
    match (state.view, state.round()) {
        (GameView::Level(_), Some(round)) => render_level(round, gfx),
        _ => render_preparation(state, gfx),
    }

    for node in &view.nodes {
        match node {
            ViewNode::Button(button) if button.id == MENU_BUTTON_ID => {
                gfx.fill_rect(button.rect, BAR_EMPTY);
                gfx.rect_outline(button.rect, WHITE);
                gfx.draw_text_centered(button.rect, &button.label, WHITE, 2);
            }
            ViewNode::Button(_) => {}
            ViewNode::Text(text) => gfx.draw_text_scaled(text.pos.0, text.pos.1, &text.text, WHITE, 2),
        }
    }
}

fn render_preparation(state: &GameState, gfx: &mut dyn Renderer2d) {
    gfx.clear(MENU_BG);

    // Trail between the level stones.
    for pair in LEVEL_BUTTONS.windows(2) {
        let (_, (x0, y0)) = pair[0];
        let (_, (x1, y1)) = pair[1];
        for step in 0..=8u32 {
            let x = (x0 * (8 - step) + x1 * step) / 8;
            let y = (y0 * (8 - step) + y1 * step) / 8;
            gfx.fill_circle(x, y, 3, DIM);
        }
    }

    for (number, (cx, cy)) in LEVEL_BUTTONS {
        gfx.fill_circle(cx, cy, BUTTON_RADIUS, BUTTON_FILL);
        let label_box = Rect::around(cx, cy, BUTTON_RADIUS * 2, BUTTON_RADIUS * 2);
        gfx.draw_text_centered(label_box, &number.to_string(), MENU_BG, 3);
    }
    if let Some(hovered) = state.view.hovered() {
        if let Some((_, (cx, cy))) = LEVEL_BUTTONS.iter().find(|(n, _)| *n == hovered) {
            gfx.ring(*cx, *cy, HOVER_RING_RADIUS, 3, WHITE);
        }
    }

    let title = "CHOOSE A LEVEL";
    let title_w = text_width(title, 3);
    gfx.draw_text_scaled(WINDOW_WIDTH.saturating_sub(title_w) / 2, 340, title, WHITE, 3);

    if let Some(last) = state.last_outcome {
        let text = match last.outcome {
            RoundOutcome::Won => format!("LEVEL {} WON! AMULET UNLOCKED", last.level),
            RoundOutcome::Lost => format!("LEVEL {} LOST", last.level),
        };
        let banner = Rect::new(40, 420, WINDOW_WIDTH - 80, 44);
        gfx.blend_rect(banner, [0, 0, 0, 255], 160);
        gfx.draw_text_centered(banner, &text, WHITE, 2);
    }

    render_inventory(state.progress, gfx);
}

fn render_inventory(progress: SessionProgress, gfx: &mut dyn Renderer2d) {
    let items = [
        ("SWORD", progress.sword),
        ("AMULET", progress.amulet),
        ("SHIELD", progress.shield),
        ("EYEBALL", progress.eyeball),
    ];
    let slot_w = WINDOW_WIDTH / items.len() as u32;
    for (i, (label, unlocked)) in items.into_iter().enumerate() {
        let slot = Rect::new(i as u32 * slot_w + 10, 800, slot_w - 20, 60);
        let color = if unlocked { BUTTON_FILL } else { DIM };
        gfx.rect_outline(slot, color);
        gfx.draw_text_centered(slot, label, color, 2);
    }
}

fn object_color(kind: ObjectKind) -> Color {
    match kind {
        ObjectKind::Sword => [120, 170, 240, 255],
        ObjectKind::Fist => [230, 150, 70, 255],
        ObjectKind::Shield => [110, 210, 140, 255],
        ObjectKind::Ok => [220, 210, 90, 255],
    }
}

fn gesture_color(gesture: ActiveGesture) -> Color {
    match gesture {
        ActiveGesture::None => DIM,
        ActiveGesture::Sword => object_color(ObjectKind::Sword),
        ActiveGesture::Fist => object_color(ObjectKind::Fist),
        ActiveGesture::Shield => object_color(ObjectKind::Shield),
        ActiveGesture::Ok => object_color(ObjectKind::Ok),
    }
}

/// Segmented bar, one segment per health point.
fn health_bar(gfx: &mut dyn Renderer2d, area: Rect, current: i32, max: i32, fill: Color) {
    let max = max.max(1) as u32;
    let current = current.clamp(0, max as i32) as u32;
    let seg_w = area.w / max;
    for i in 0..max {
        let seg = Rect::new(area.x + i * seg_w, area.y, seg_w.saturating_sub(2), area.h);
        gfx.fill_rect(seg, if i < current { fill } else { BAR_EMPTY });
    }
}

fn render_enemy(gfx: &mut dyn Renderer2d) {
    let (x, y) = ENEMY_POS;
    let body = Rect::new(x, y, 200, 150);
    gfx.fill_rect(body, [90, 40, 110, 255]);
    gfx.rect_outline(body, [160, 90, 190, 255]);
    gfx.fill_circle(x + 60, y + 55, 16, WHITE);
    gfx.fill_circle(x + 140, y + 55, 16, WHITE);
    gfx.fill_circle(x + 64, y + 58, 6, [20, 0, 0, 255]);
    gfx.fill_circle(x + 136, y + 58, 6, [20, 0, 0, 255]);
    gfx.fill_rect(Rect::new(x + 50, y + 105, 100, 12), [20, 0, 0, 255]);
}

fn render_level(round: &LevelRound, gfx: &mut dyn Renderer2d) {
    let level = round.level();
    gfx.clear(LEVEL_BG);
    render_enemy(gfx);

    gfx.draw_text_scaled(200, 52, "ENEMY", WHITE, 2);
    health_bar(
        gfx,
        Rect::new(200, 70, 200, 14),
        round.enemy_health(),
        level.enemy_health,
        ENEMY_FILL,
    );

    let bottom = level.bottom_threshold.max(0) as u32;
    gfx.blend_rect(Rect::new(0, bottom, WINDOW_WIDTH, 2), WHITE, 60);

    for obj in round.objects() {
        let rect = Rect::new(
            obj.x.max(0) as u32,
            obj.y.max(0) as u32,
            OBJECT_SIZE,
            OBJECT_SIZE,
        );
        gfx.fill_rect(rect, object_color(obj.kind));
        gfx.rect_outline(rect, WHITE);
        gfx.draw_text_centered(rect, obj.kind.label(), LEVEL_BG, 1);
    }

    gfx.draw_text_scaled(12, 850, "HP", WHITE, 2);
    health_bar(
        gfx,
        Rect::new(44, 848, 200, 16),
        round.player_health(),
        level.player_health,
        HEALTH_FILL,
    );

    let active = round.active_gesture();
    let status = Rect::new(360, 842, 228, 30);
    gfx.fill_rect(status, BAR_EMPTY);
    gfx.rect_outline(status, gesture_color(active));
    gfx.draw_text_centered(status, &active.label().to_ascii_uppercase(), gesture_color(active), 2);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_boxes_match_open_intervals() {
        // Level 1 reacts on 280 < x < 346 and 240 < y < 278.
        assert_eq!(hovered_level((281, 241)), Some(1));
        assert_eq!(hovered_level((345, 277)), Some(1));
        assert_eq!(hovered_level((280, 259)), None);
        assert_eq!(hovered_level((346, 259)), None);
        assert_eq!(hovered_level((313, 240)), None);
        assert_eq!(hovered_level((313, 278)), None);

        assert_eq!(hovered_level((249, 189)), Some(2));
        assert_eq!(hovered_level((289, 106)), Some(3));
        assert_eq!(hovered_level((302, 64)), Some(4));
        assert_eq!(hovered_level((10, 10)), None);
    }

    #[test]
    fn preparation_tree_has_one_button_per_level() {
        let tree = build_view_tree(&GameState::default());
        let actions: Vec<_> = tree.buttons().map(|b| b.action).collect();
        assert_eq!(
            actions,
            (1..=4).map(UiAction::SelectLevel).collect::<Vec<_>>()
        );
    }
}
