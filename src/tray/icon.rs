use anyhow::Result;
use tray_icon::Icon;

const ICON_SIZE: u32 = 32;
const ICON_COLOR: [u8; 4] = [204, 0, 0, 255];

pub fn create_icon() -> Result<Icon> {
    let data = render_icon(ICON_SIZE);
    Ok(Icon::from_rgba(data, ICON_SIZE, ICON_SIZE)?)
}

/// Filled disc on a transparent square, RGBA.
fn render_icon(size: u32) -> Vec<u8> {
    let mut data = vec![0u8; (size * size * 4) as usize];
    let radius = (size as i32) / 2 - 2;
    let center = (size as i32) / 2;

    for y in 0..size as i32 {
        for x in 0..size as i32 {
            let dx = x - center;
            let dy = y - center;

            if dx * dx + dy * dy <= radius * radius {
                let idx = ((y as u32 * size + x as u32) * 4) as usize;
                data[idx..idx + 4].copy_from_slice(&ICON_COLOR);
            }
        }
    }
    data
}
