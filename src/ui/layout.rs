// SPDX-License-Identifier: MPL-2.0
//! Pure geometry for the video surface and the control group.

use super::scene::Bounds;

/// Scales the media to the largest size that fits the stage while keeping
/// its aspect ratio, and centers it (letterbox or pillarbox).
///
/// Unknown (zero) media dimensions fill the whole stage.
#[must_use]
pub fn fit_video(media_width: u32, media_height: u32, stage_width: f32, stage_height: f32) -> Bounds {
    if media_width == 0 || media_height == 0 || stage_width <= 0.0 || stage_height <= 0.0 {
        return Bounds {
            x: 0.0,
            y: 0.0,
            width: stage_width.max(0.0),
            height: stage_height.max(0.0),
        };
    }

    let media_width = media_width as f32;
    let media_height = media_height as f32;
    let scale = (stage_width / media_width).min(stage_height / media_height);
    let width = media_width * scale;
    let height = media_height * scale;

    Bounds {
        x: (stage_width - width) / 2.0,
        y: (stage_height - height) / 2.0,
        width,
        height,
    }
}

/// Space kept between the control group and the stage edges.
pub const CONTROLS_MARGIN: f32 = 8.0;

/// Smallest factor the control group is ever drawn at.
const MIN_CONTROLS_SCALE: f32 = 0.1;

/// Factor that shrinks a `group_width` x `group_height` control group so it
/// fits the stage width and the bottom third of the stage. Never enlarges.
#[must_use]
pub fn controls_scale(
    stage_width: f32,
    stage_height: f32,
    group_width: f32,
    group_height: f32,
) -> f32 {
    let by_width = (stage_width - 2.0 * CONTROLS_MARGIN) / group_width;
    let by_height = (stage_height / 3.0 - CONTROLS_MARGIN) / group_height;
    by_width.min(by_height).clamp(MIN_CONTROLS_SCALE, 1.0)
}

/// Top-left corner of the control group: horizontally centered, with its
/// top edge at two thirds of the stage height.
#[must_use]
pub fn controls_origin(stage_width: f32, stage_height: f32, group_width: f32) -> (f32, f32) {
    (
        ((stage_width - group_width) / 2.0).max(0.0),
        stage_height - stage_height / 3.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_abs_diff_eq, assert_relative_eq};

    fn assert_contained(fit: Bounds, stage_width: f32, stage_height: f32) {
        assert!(fit.x >= -1e-3 && fit.y >= -1e-3);
        assert!(fit.x + fit.width <= stage_width + 1e-3);
        assert!(fit.y + fit.height <= stage_height + 1e-3);
    }

    #[test]
    fn wide_video_is_letterboxed() {
        let fit = fit_video(1920, 1080, 1000.0, 1000.0);
        assert_abs_diff_eq!(fit.width, 1000.0, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.height, 562.5, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.x, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.y, 218.75, epsilon = 1e-3);
    }

    #[test]
    fn tall_video_is_pillarboxed() {
        let fit = fit_video(1080, 1920, 1600.0, 900.0);
        assert_abs_diff_eq!(fit.height, 900.0, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.width, 506.25, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.x, (1600.0 - 506.25) / 2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.y, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn wide_video_in_wider_stage_is_fit_to_height() {
        let fit = fit_video(1280, 720, 3000.0, 720.0);
        assert_abs_diff_eq!(fit.height, 720.0, epsilon = 1e-3);
        assert_abs_diff_eq!(fit.width, 1280.0, epsilon = 1e-3);
        assert_contained(fit, 3000.0, 720.0);
    }

    #[test]
    fn fit_keeps_aspect_ratio_and_stays_inside_stage() {
        let media = [(640, 480), (1920, 1080), (720, 1280), (100, 100), (4096, 200)];
        let stages = [(800.0, 600.0), (1920.0, 1080.0), (300.0, 900.0), (1.0, 1.0)];
        for &(mw, mh) in &media {
            for &(sw, sh) in &stages {
                let fit = fit_video(mw, mh, sw, sh);
                assert_relative_eq!(
                    fit.width / fit.height,
                    mw as f32 / mh as f32,
                    max_relative = 1e-3
                );
                assert_contained(fit, sw, sh);
            }
        }
    }

    #[test]
    fn unknown_media_size_fills_stage() {
        let fit = fit_video(0, 0, 800.0, 600.0);
        assert_eq!(
            fit,
            Bounds {
                x: 0.0,
                y: 0.0,
                width: 800.0,
                height: 600.0
            }
        );
    }

    #[test]
    fn controls_sit_centered_at_two_thirds() {
        let (x, y) = controls_origin(1200.0, 900.0, 800.0);
        assert_abs_diff_eq!(x, 200.0);
        assert_abs_diff_eq!(y, 600.0);
    }

    #[test]
    fn controls_wider_than_stage_stick_to_left_edge() {
        let (x, _) = controls_origin(600.0, 300.0, 800.0);
        assert_abs_diff_eq!(x, 0.0);
    }

    #[test]
    fn controls_keep_full_size_on_large_stages() {
        assert_abs_diff_eq!(controls_scale(1920.0, 1080.0, 880.0, 160.0), 1.0);
    }

    #[test]
    fn controls_shrink_to_narrow_and_short_stages() {
        let narrow = controls_scale(640.0, 1000.0, 880.0, 160.0);
        assert_abs_diff_eq!(narrow, (640.0 - 2.0 * CONTROLS_MARGIN) / 880.0, epsilon = 1e-4);

        let short = controls_scale(1920.0, 240.0, 880.0, 160.0);
        assert_abs_diff_eq!(short, (80.0 - CONTROLS_MARGIN) / 160.0, epsilon = 1e-4);
    }

    #[test]
    fn scaled_controls_stay_inside_stage() {
        let stages = [(320.0, 240.0), (640.0, 360.0), (720.0, 576.0), (1280.0, 720.0)];
        for &(sw, sh) in &stages {
            let scale = controls_scale(sw, sh, 880.0, 160.0);
            let (width, height) = (880.0 * scale, 160.0 * scale);
            let (x, y) = controls_origin(sw, sh, width);
            assert!(x >= 0.0 && x + width <= sw, "{sw}x{sh}: x={x} w={width}");
            assert!(y + height <= sh, "{sw}x{sh}: y={y} h={height}");
        }
    }
}
