use funnel_core::Engine;
use funnel_render::svg::{SvgRenderOptions, render_funnel_debug_svg};
use funnel_render::{LayoutOptions, layout_parsed};
use std::io::Read;

fn main() {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .expect("read stdin");

    let engine = Engine::new();
    let parsed = engine.parse_document_sync(&input).expect("parse ok");

    let layouted = layout_parsed(&parsed, &LayoutOptions::default()).expect("layout ok");
    let options = SvgRenderOptions {
        include_placeholders: true,
        ..Default::default()
    };
    let svg = render_funnel_debug_svg(&layouted.layout, &options);
    print!("{svg}");
}
