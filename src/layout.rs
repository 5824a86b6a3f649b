//! Masonry layout: shortest-column-first bin packing over a fixed column
//! count. A pass is pure and wholesale; callers re-run it on any input change
//! rather than patching positions.

use crate::catalog::GalleryImage;

/// One positioned grid cell, valid only for the pass that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutItem {
    pub image: GalleryImage,
    pub column: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Result of one layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub items: Vec<LayoutItem>,
    /// Maximum final column accumulator; size the container to this so
    /// following content never overlaps the grid.
    pub total_height: f32,
}

/// Map a viewport width to a column count. The widest tier uses the
/// configured default; narrower tiers collapse to two then one column.
#[must_use]
pub fn column_count_for_width(viewport_width: f32, configured: usize) -> usize {
    if viewport_width <= 640.0 {
        1
    } else if viewport_width <= 1024.0 {
        2
    } else {
        configured.max(1)
    }
}

/// Lay out `images` in catalog order. Each image goes into the column with
/// the smallest accumulated height, ties broken by lowest column index, so a
/// pass is deterministic and idempotent for identical inputs.
///
/// `ratio_of` supplies the aspect ratio per image (see
/// [`crate::aspect::AspectRatioResolver`]); it must return a ratio > 0.
pub fn layout(
    images: &[GalleryImage],
    mut ratio_of: impl FnMut(&GalleryImage) -> f32,
    column_count: usize,
    column_gap: f32,
    container_width: f32,
) -> Layout {
    let column_count = column_count.max(1);
    let column_width =
        (container_width - column_gap * (column_count as f32 - 1.0)) / column_count as f32;

    let mut accumulated = vec![0.0_f32; column_count];
    let mut items = Vec::with_capacity(images.len());

    for image in images {
        let column = shortest_column(&accumulated);
        let ratio = ratio_of(image);
        let height = column_width / ratio;
        let x = column as f32 * (column_width + column_gap);
        let y = accumulated[column];
        items.push(LayoutItem {
            image: image.clone(),
            column,
            x,
            y,
            width: column_width,
            height,
        });
        accumulated[column] += height + column_gap;
    }

    let total_height = accumulated.iter().copied().fold(0.0_f32, f32::max);
    Layout {
        items,
        total_height,
    }
}

/// Index of the least-filled column; the first such index on ties.
fn shortest_column(accumulated: &[f32]) -> usize {
    let mut best = 0;
    for (index, height) in accumulated.iter().enumerate().skip(1) {
        if *height < accumulated[best] {
            best = index;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(src: &str) -> GalleryImage {
        GalleryImage {
            src: src.to_string(),
            alt: String::new(),
            category: None,
            date: None,
            location: None,
        }
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= 0.001
    }

    #[test]
    fn heights_follow_column_width_over_ratio() {
        let images = vec![img("a"), img("b")];
        let result = layout(&images, |_| 2.0, 2, 10.0, 410.0);
        // column width = (410 - 10) / 2 = 200
        for item in &result.items {
            assert!(close(item.width, 200.0), "width {}", item.width);
            assert!(close(item.height, 100.0), "height {}", item.height);
        }
    }

    #[test]
    fn four_image_two_column_packing() {
        let images = vec![img("a"), img("b"), img("c"), img("d")];
        let ratios = [1.0_f32, 2.0, 0.5, 1.0];
        let result = layout(
            &images,
            |image| {
                let idx = images.iter().position(|i| i.src == image.src).unwrap();
                ratios[idx]
            },
            2,
            0.0,
            400.0,
        );

        // Shortest-column-first: a -> col 0 (h 200), b -> col 1 (h 100),
        // c -> col 1 (100 < 200, h 400), d -> col 0 (200 < 500, h 200).
        let columns: Vec<usize> = result.items.iter().map(|i| i.column).collect();
        assert_eq!(columns, vec![0, 1, 1, 0]);
        let heights: Vec<f32> = result.items.iter().map(|i| i.height).collect();
        for (got, want) in heights.iter().zip([200.0, 100.0, 400.0, 200.0]) {
            assert!(close(*got, want), "height {got} vs {want}");
        }
        assert!(close(result.items[2].y, 100.0));
        assert!(close(result.items[3].y, 200.0));
        assert!(close(result.total_height, 500.0), "total {}", result.total_height);
    }

    #[test]
    fn every_placement_targets_the_shortest_column() {
        let images: Vec<GalleryImage> =
            (0..40).map(|i| img(&format!("/images/x/{i}.jpg"))).collect();
        let ratio = |image: &GalleryImage| {
            let n = image.src.len() as f32;
            0.5 + (n % 7.0) * 0.3
        };
        let result = layout(&images, ratio, 3, 12.0, 1200.0);

        // Replay the pass against fresh accumulators.
        let mut accumulated = [0.0_f32; 3];
        for item in &result.items {
            let min = accumulated.iter().copied().fold(f32::INFINITY, f32::min);
            assert!(
                close(accumulated[item.column], min),
                "item {} placed in column {} at height {} but min was {}",
                item.image.src,
                item.column,
                accumulated[item.column],
                min
            );
            let tie_winner = accumulated.iter().position(|h| close(*h, min)).unwrap();
            assert_eq!(item.column, tie_winner, "tie must break to lowest index");
            assert!(close(item.y, accumulated[item.column]));
            accumulated[item.column] += item.height + 12.0;
        }
    }

    #[test]
    fn identical_inputs_yield_identical_layouts() {
        let images: Vec<GalleryImage> =
            (0..25).map(|i| img(&format!("/images/x/{i}.jpg"))).collect();
        let ratio = |image: &GalleryImage| 0.6 + (image.src.len() % 5) as f32 * 0.25;
        let first = layout(&images, ratio, 3, 16.0, 1280.0);
        let second = layout(&images, ratio, 3, 16.0, 1280.0);
        assert_eq!(first, second);
    }

    #[test]
    fn responsive_tiers() {
        assert_eq!(column_count_for_width(320.0, 3), 1);
        assert_eq!(column_count_for_width(640.0, 3), 1);
        assert_eq!(column_count_for_width(768.0, 3), 2);
        assert_eq!(column_count_for_width(1024.0, 3), 2);
        assert_eq!(column_count_for_width(1440.0, 3), 3);
        assert_eq!(column_count_for_width(1440.0, 4), 4);
    }

    #[test]
    fn empty_input_is_a_zero_height_layout() {
        let result = layout(&[], |_| 1.0, 3, 16.0, 1280.0);
        assert!(result.items.is_empty());
        assert!(close(result.total_height, 0.0));
    }
}
