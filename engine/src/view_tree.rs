use serde::{Deserialize, Serialize};

use crate::ui::Rect;

/// Flat list of interactive and decorative nodes, topmost last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewTree<A> {
    pub nodes: Vec<ViewNode<A>>,
}

impl<A> Default for ViewTree<A> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<A> ViewTree<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: ViewNode<A>) {
        self.nodes.push(node);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn buttons(&self) -> impl Iterator<Item = &ButtonNode<A>> {
        self.nodes.iter().filter_map(|node| match node {
            ViewNode::Button(button) => Some(button),
            ViewNode::Text(_) => None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ViewNode<A> {
    Button(ButtonNode<A>),
    Text(TextNode),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonNode<A> {
    pub id: u32,
    pub rect: Rect,
    pub label: String,
    pub action: A,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextNode {
    pub pos: (u32, u32),
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerInput {
    pub mouse_pos: Option<(u32, u32)>,
    pub mouse_down: bool,
    pub mouse_up: bool,
}

/// Topmost enabled button under the pointer.
pub fn hovered_button<A>(view: &ViewTree<A>, pos: Option<(u32, u32)>) -> Option<&ButtonNode<A>> {
    let (mx, my) = pos?;
    view.nodes.iter().rev().find_map(|node| match node {
        ViewNode::Button(button) if button.enabled && button.rect.contains(mx, my) => Some(button),
        _ => None,
    })
}

/// Actions of every enabled button under the pointer on mouse release, topmost first.
pub fn hit_test_actions<A: Clone>(view: &ViewTree<A>, input: PointerInput) -> Vec<A> {
    if !input.mouse_up {
        return Vec::new();
    }
    let Some((mx, my)) = input.mouse_pos else {
        return Vec::new();
    };
    view.nodes
        .iter()
        .rev()
        .filter_map(|node| match node {
            ViewNode::Button(button) if button.enabled && button.rect.contains(mx, my) => {
                Some(button.action.clone())
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> ViewTree<u8> {
        let mut tree = ViewTree::new();
        tree.push(ViewNode::Button(ButtonNode {
            id: 1,
            rect: Rect::new(0, 0, 10, 10),
            label: "A".into(),
            action: 1,
            enabled: true,
        }));
        tree.push(ViewNode::Button(ButtonNode {
            id: 2,
            rect: Rect::new(5, 5, 10, 10),
            label: "B".into(),
            action: 2,
            enabled: true,
        }));
        tree.push(ViewNode::Button(ButtonNode {
            id: 3,
            rect: Rect::new(20, 20, 10, 10),
            label: "C".into(),
            action: 3,
            enabled: false,
        }));
        tree
    }

    #[test]
    fn release_over_overlap_reports_topmost_first() {
        let input = PointerInput {
            mouse_pos: Some((6, 6)),
            mouse_down: false,
            mouse_up: true,
        };
        assert_eq!(hit_test_actions(&tree(), input), vec![2, 1]);
    }

    #[test]
    fn no_actions_without_release() {
        let input = PointerInput {
            mouse_pos: Some((1, 1)),
            mouse_down: true,
            mouse_up: false,
        };
        assert!(hit_test_actions(&tree(), input).is_empty());
    }

    #[test]
    fn disabled_buttons_are_not_hovered() {
        let tree = tree();
        assert!(hovered_button(&tree, Some((25, 25))).is_none());
        assert_eq!(hovered_button(&tree, Some((1, 1))).map(|b| b.id), Some(1));
        assert!(hovered_button(&tree, None).is_none());
    }
}
