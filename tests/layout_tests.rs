use gallery_engine::aspect::AspectRatioResolver;
use gallery_engine::catalog::GalleryImage;
use gallery_engine::config::AspectOptions;
use gallery_engine::layout::{column_count_for_width, layout};
use gallery_engine::metadata::{ImageMetadata, MetadataMap, Orientation};

fn img(src: &str, category: Option<&str>) -> GalleryImage {
    GalleryImage {
        src: src.to_string(),
        alt: String::new(),
        category: category.map(str::to_string),
        date: None,
        location: None,
    }
}

fn meta(width: u32, height: u32) -> ImageMetadata {
    let ratio = width as f32 / height as f32;
    ImageMetadata {
        width,
        height,
        aspect_ratio: ratio,
        orientation: if ratio > 1.0 {
            Orientation::Landscape
        } else if ratio < 1.0 {
            Orientation::Portrait
        } else {
            Orientation::Square
        },
    }
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() <= 0.001
}

#[test]
fn known_ratios_drive_exact_heights() {
    let mut metadata = MetadataMap::new();
    metadata.insert("/images/travel/a.jpg".to_string(), meta(1600, 800));
    metadata.insert("/images/travel/b.jpg".to_string(), meta(800, 1600));
    let images = vec![
        img("/images/travel/a.jpg", None),
        img("/images/travel/b.jpg", None),
    ];
    let mut resolver = AspectRatioResolver::new(AspectOptions::default());

    let result = layout(
        &images,
        |image| resolver.resolve(image, &metadata),
        2,
        20.0,
        420.0,
    );

    // column width = (420 - 20) / 2 = 200
    assert!(close(result.items[0].height, 100.0));
    assert!(close(result.items[1].height, 400.0));
    assert!(close(result.items[1].x, 220.0));
}

#[test]
fn passes_with_identical_inputs_are_pixel_identical() {
    let mut metadata = MetadataMap::new();
    for i in 0..30 {
        metadata.insert(
            format!("/images/travel/{i}.jpg"),
            meta(1200, 600 + (i % 7) * 150),
        );
    }
    let images: Vec<GalleryImage> = (0..30)
        .map(|i| img(&format!("/images/travel/{i}.jpg"), Some("travel")))
        .collect();
    let mut resolver = AspectRatioResolver::new(AspectOptions::default());

    let first = layout(
        &images,
        |image| resolver.resolve(image, &metadata),
        3,
        16.0,
        1280.0,
    );
    // Second pass goes through the session memo; positions must not move.
    let second = layout(
        &images,
        |image| resolver.resolve(image, &metadata),
        3,
        16.0,
        1280.0,
    );
    assert_eq!(first, second);
}

#[test]
fn metadata_outage_falls_back_to_category_defaults() {
    // Whole fetch failed: every portrait image must get the portrait default,
    // not the global default.
    let metadata = MetadataMap::new();
    let images: Vec<GalleryImage> = (0..4)
        .map(|i| img(&format!("/images/portrait/{i}.jpg"), Some("portrait")))
        .collect();
    let mut resolver = AspectRatioResolver::new(AspectOptions::default());

    let result = layout(
        &images,
        |image| resolver.resolve(image, &metadata),
        1,
        0.0,
        300.0,
    );
    for item in &result.items {
        // 300 / 0.75 = 400
        assert!(close(item.height, 400.0), "height {}", item.height);
    }
}

#[test]
fn tier_change_relayouts_into_fewer_columns() {
    let metadata = MetadataMap::new();
    let images: Vec<GalleryImage> = (0..6)
        .map(|i| img(&format!("/images/misc/{i}.jpg"), None))
        .collect();
    let mut resolver = AspectRatioResolver::new(AspectOptions::default());

    let wide_columns = column_count_for_width(1280.0, 3);
    let narrow_columns = column_count_for_width(600.0, 3);
    assert_eq!(wide_columns, 3);
    assert_eq!(narrow_columns, 1);

    let wide = layout(
        &images,
        |image| resolver.resolve(image, &metadata),
        wide_columns,
        12.0,
        1280.0,
    );
    let narrow = layout(
        &images,
        |image| resolver.resolve(image, &metadata),
        narrow_columns,
        12.0,
        600.0,
    );
    assert!(wide.items.iter().any(|item| item.column == 2));
    assert!(narrow.items.iter().all(|item| item.column == 0));
    assert!(narrow.total_height > wide.total_height);
}

#[test]
fn total_height_clears_every_column() {
    let mut metadata = MetadataMap::new();
    metadata.insert("/images/x/tall.jpg".to_string(), meta(500, 2000));
    metadata.insert("/images/x/wide.jpg".to_string(), meta(2000, 500));
    let images = vec![img("/images/x/tall.jpg", None), img("/images/x/wide.jpg", None)];
    let mut resolver = AspectRatioResolver::new(AspectOptions::default());

    let result = layout(
        &images,
        |image| resolver.resolve(image, &metadata),
        2,
        10.0,
        810.0,
    );
    for item in &result.items {
        assert!(item.y + item.height <= result.total_height + 0.001);
    }
}
