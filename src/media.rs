use std::io::{stdout, Write};

use image::imageops::FilterType;
use image::DynamicImage;

/// Re-encode an image as the pad's raw 24-bit BGR framebuffer format.
///
/// Resizes to fill the screen, mixes transparency against the given
/// background color, and emits 3 bytes per pixel in BGR order, row-major
/// with no padding.
pub fn encode_image(
    image: DynamicImage,
    background: [u8; 3],
    nearest: bool,
    width: u32,
    height: u32,
) -> Vec<u8> {
    print!("resizing and encoding image ... ");
    stdout().flush().unwrap();
    let [br, bg, bb] = background;

    let buf = image
        .resize_to_fill(
            width,
            height,
            if nearest {
                FilterType::Nearest
            } else {
                FilterType::Gaussian
            },
        )
        .to_rgba8()
        .pixels()
        .flat_map(|p| {
            let [mut r, mut g, mut b, a] = p.0;

            // Mix alpha values against the background
            let a = a as f64 / 255.0;
            let ba = 1. - a;
            r = ((br as f64 * ba) + (r as f64 * a)) as u8;
            g = ((bg as f64 * ba) + (g as f64 * a)) as u8;
            b = ((bb as f64 * ba) + (b as f64 * a)) as u8;

            // Device byte order is blue-green-red
            [b, g, r]
        })
        .collect::<Vec<_>>();
    debug_assert_eq!(buf.len(), (width * height * 3) as usize);

    println!("done");
    buf
}
