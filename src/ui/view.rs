// SPDX-License-Identifier: MPL-2.0
//! Renders a [`Scene`] into iced widgets.
//!
//! Each drawable node becomes a fixed-size widget placed with padding inside a
//! full-window layer; the layers are stacked in paint order over a black
//! background.

use iced::widget::{image, mouse_area, svg, Column, Container, Stack, Text};
use iced::{mouse, Background, ContentFit, Element, Length, Padding, Theme};
use std::time::Instant;

use super::assets;
use super::scene::{Color, NodeId, NodeKind, Scene};
use crate::stage::Stage;

const BACKGROUND: iced::Color = iced::Color::BLACK;
const PLACEHOLDER_TEXT_SIZE: f32 = 20.0;

/// Everything the player view is drawn from.
pub struct ViewContext<'a> {
    pub scene: &'a Scene,
    pub stage: &'a Stage,
    /// Latest decoded frame, drawn on the video surface.
    pub frame: Option<&'a image::Handle>,
    /// Message shown centered while there are no controls yet.
    pub placeholder: Option<&'a str>,
    pub now: Instant,
}

pub fn view<'a, Message: Clone + 'a>(ctx: ViewContext<'a>) -> Element<'a, Message> {
    let mut stack = Stack::new().width(Length::Fill).height(Length::Fill);

    for (id, alpha) in drawable_nodes(ctx.scene, ctx.now) {
        if let Some(element) = node_element(ctx.scene, id, alpha, ctx.frame) {
            stack = stack.push(positioned(ctx.scene, id, element));
        }
    }

    if let Some(message) = ctx.placeholder {
        stack = stack.push(
            Container::new(
                Text::new(message)
                    .size(PLACEHOLDER_TEXT_SIZE)
                    .color(iced::Color::WHITE),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill),
        );
    }

    let interaction = if ctx.stage.cursor_visible() {
        mouse::Interaction::default()
    } else {
        mouse::Interaction::Hidden
    };

    Container::new(mouse_area(stack).interaction(interaction))
        .width(Length::Fill)
        .height(Length::Fill)
        .style(|_theme: &Theme| iced::widget::container::Style {
            background: Some(Background::Color(BACKGROUND)),
            ..Default::default()
        })
        .into()
}

/// Visible, non-group nodes with a non-zero effective opacity, in paint order.
fn drawable_nodes(scene: &Scene, now: Instant) -> Vec<(NodeId, f32)> {
    scene
        .paint_order()
        .into_iter()
        .filter(|&id| !matches!(scene.kind(id), NodeKind::Group) && scene.is_visible(id))
        .filter_map(|id| {
            let alpha = scene.effective_opacity(id, now);
            (alpha > 0.0).then_some((id, alpha))
        })
        .collect()
}

fn node_element<'a, Message: 'a>(
    scene: &'a Scene,
    id: NodeId,
    alpha: f32,
    frame: Option<&'a image::Handle>,
) -> Option<Element<'a, Message>> {
    let (width, height) = scene.size(id);
    let width = Length::Fixed(width);
    let height = Length::Fixed(height);

    match scene.kind(id) {
        NodeKind::Group => None,
        NodeKind::Rect { color } => {
            let fill = to_iced(*color, alpha);
            Some(
                Container::new(Column::new())
                    .width(width)
                    .height(height)
                    .style(move |_theme: &Theme| iced::widget::container::Style {
                        background: Some(Background::Color(fill)),
                        ..Default::default()
                    })
                    .into(),
            )
        }
        NodeKind::Image(asset) => Some(
            svg::Svg::new(assets::handle(*asset))
                .width(width)
                .height(height)
                .opacity(alpha)
                .into(),
        ),
        NodeKind::Text {
            content,
            size,
            color,
        } => Some(
            Text::new(content.as_str())
                .size(*size)
                .color(to_iced(*color, alpha))
                .width(width)
                .height(height)
                .into(),
        ),
        NodeKind::VideoSurface => frame.map(|handle| {
            image::Image::new(handle.clone())
                .width(width)
                .height(height)
                .content_fit(ContentFit::Fill)
                .opacity(alpha)
                .into()
        }),
    }
}

/// Places `element` at the node's stage position inside a full-window layer.
fn positioned<'a, Message: 'a>(
    scene: &Scene,
    id: NodeId,
    element: Element<'a, Message>,
) -> Element<'a, Message> {
    let (x, y) = scene.absolute_position(id);
    Container::new(element)
        .padding(Padding {
            top: y,
            right: 0.0,
            bottom: 0.0,
            left: x,
        })
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn to_iced(color: Color, alpha: f32) -> iced::Color {
    iced::Color::from_rgba8(color.r, color.g, color.b, f32::from(color.a) / 255.0 * alpha)
}
