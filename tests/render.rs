use std::path::{Path, PathBuf};

use gfxdemo::events::Event;
use gfxdemo::gfx::Color;
use gfxdemo::math::{Rect, ivec2};
use gfxdemo::policy::{PrimitivesLayout, viewport_rects};
use gfxdemo::{Call, Game, GameConfig, HeadlessBackend, HeadlessConfig, PixelBuffer, PolicyKind};

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];
const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const YELLOW: [u8; 4] = [255, 255, 0, 255];

// 2x2 texture, one color per quadrant
const TEXELS: [[u8; 4]; 4] = [
    [200, 10, 10, 255],
    [10, 200, 10, 255],
    [10, 10, 200, 255],
    [200, 200, 10, 255],
];

fn write_quadrants_texture(dir: &Path) -> PathBuf {
    let path = dir.join("texture.png");
    let img = image::RgbaImage::from_fn(2, 2, |x, y| image::Rgba(TEXELS[(y * 2 + x) as usize]));
    img.save(&path).unwrap();
    path
}

fn render_one_frame(config: GameConfig) -> (Vec<Call>, PixelBuffer) {
    let backend = HeadlessBackend::new(HeadlessConfig::new().events(&[Event::Quit]));
    let log = backend.log();

    let report = Game::new(backend, config).run();
    assert_eq!(report.frames, 1);

    let frame = log.last_frame().expect("A frame must be presented");
    (log.last_frame_calls(), frame)
}

#[test]
fn test_primitives_calls_800x600() {
    let config = GameConfig::new()
        .size(800, 600)
        .policy(PolicyKind::Primitives)
        .outline_scale(1.5)
        .dot_spacing(5)
        .texture_path("missing.png");

    let (calls, _) = render_one_frame(config);

    assert_eq!(
        calls[..8],
        [
            Call::SetViewport(None),
            Call::SetDrawColor(Color::WHITE),
            Call::Clear,
            Call::SetDrawColor(Color::RED),
            Call::FillRect(Rect::new(200, 150, 400, 300)),
            Call::SetDrawColor(Color::GREEN),
            Call::DrawRect(Rect::new(100, 75, 600, 450)),
            Call::SetDrawColor(Color::BLUE),
        ]
    );
    assert_eq!(calls[8], Call::DrawLine(ivec2(0, 300), ivec2(800, 300)));
    assert_eq!(calls[9], Call::SetDrawColor(Color::YELLOW));

    let dots: Vec<_> = calls[10..]
        .iter()
        .map(|c| match c {
            Call::DrawPoint(p) => *p,
            other => panic!("Unexpected call {other:?}"),
        })
        .collect();
    let expected: Vec<_> = (0..600).step_by(5).map(|y| ivec2(400, y)).collect();
    assert_eq!(dots, expected);
}

#[test]
fn test_primitives_pixels_800x600() {
    let config = GameConfig::new()
        .size(800, 600)
        .policy(PolicyKind::Primitives)
        .texture_path("missing.png");

    let (_, frame) = render_one_frame(config);
    let px = |x, y| frame.get(x, y).unwrap();

    // fill rect (200,150)-(600,450)
    assert_eq!(px(200, 150), RED);
    assert_eq!(px(599, 449), RED);
    assert_eq!(px(199, 150), WHITE);
    assert_eq!(px(600, 449), WHITE);
    assert_eq!(px(599, 450), WHITE);

    // outline, one pixel wide
    assert_eq!(px(100, 75), GREEN);
    assert_eq!(px(699, 524), GREEN);
    assert_eq!(px(101, 76), WHITE);
    assert_eq!(px(99, 75), WHITE);

    // line across the whole width
    assert_eq!(px(0, 300), BLUE);
    assert_eq!(px(250, 300), BLUE);
    assert_eq!(px(799, 300), BLUE);
    assert_eq!(px(250, 301), RED);

    // dots are drawn last
    assert_eq!(px(400, 0), YELLOW);
    assert_eq!(px(400, 300), YELLOW);
    assert_eq!(px(400, 595), YELLOW);
    assert_eq!(px(400, 1), WHITE);
    assert_eq!(px(400, 201), RED);
    assert_eq!(px(400, 599), WHITE);
}

#[test]
fn test_primitives_scale_with_the_window() {
    let config = GameConfig::new()
        .size(320, 240)
        .policy(PolicyKind::Primitives)
        .texture_path("missing.png");

    let (_, frame) = render_one_frame(config);
    let layout = PrimitivesLayout::new(frame.size(), 1.5, 5);
    assert_eq!(layout.fill, Rect::new(80, 60, 160, 120));

    assert_eq!(frame.get(80, 60), Some(RED));
    assert_eq!(frame.get(79, 61), Some(WHITE));
    assert_eq!(frame.get(160, 0), Some(YELLOW));
}

#[test]
fn test_viewports_copy_the_texture() {
    let dir = tempfile::tempdir().unwrap();
    let config = GameConfig::new()
        .size(800, 600)
        .policy(PolicyKind::Viewports)
        .texture_path(write_quadrants_texture(dir.path()));

    let (calls, frame) = render_one_frame(config);

    let viewports: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            Call::SetViewport(Some(r)) => Some(*r),
            _ => None,
        })
        .collect();
    assert_eq!(viewports, viewport_rects(frame.size()).to_vec());
    assert_eq!(calls.iter().filter(|c| matches!(c, Call::Copy { .. })).count(), 3);
    assert_eq!(calls.iter().filter(|c| **c == Call::Clear).count(), 1);

    let px = |x, y| frame.get(x, y).unwrap();

    // top-left viewport (0, 0, 399, 299)
    assert_eq!(px(0, 0), TEXELS[0]);
    assert_eq!(px(398, 0), TEXELS[1]);
    assert_eq!(px(0, 298), TEXELS[2]);
    assert_eq!(px(398, 298), TEXELS[3]);

    // one pixel gaps at the split lines
    assert_eq!(px(399, 10), BLACK);
    assert_eq!(px(10, 299), BLACK);

    // top-right viewport (400, 0, 400, 299)
    assert_eq!(px(400, 0), TEXELS[0]);
    assert_eq!(px(799, 298), TEXELS[3]);

    // bottom viewport (0, 300, 800, 300)
    assert_eq!(px(0, 300), TEXELS[0]);
    assert_eq!(px(799, 300), TEXELS[1]);
    assert_eq!(px(0, 599), TEXELS[2]);
    assert_eq!(px(799, 599), TEXELS[3]);
}

#[test]
fn test_viewports_without_texture_stay_cleared() {
    let config = GameConfig::new()
        .size(64, 64)
        .policy(PolicyKind::Viewports)
        .clear_color(Color::BLUE)
        .texture_path("missing.png");

    let (calls, frame) = render_one_frame(config);
    assert!(!calls.iter().any(|c| matches!(c, Call::Copy { .. })));

    for (x, y) in [(0, 0), (40, 10), (63, 63)] {
        assert_eq!(frame.get(x, y), Some(BLUE));
    }
}
