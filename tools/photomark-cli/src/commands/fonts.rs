//! Report font capabilities on this system.

use photomark_render_engine::text::probe_fonts;

pub fn run() -> anyhow::Result<()> {
    let report = probe_fonts();

    println!("Font capabilities:");
    match &report.latin {
        Some(path) => println!("  Latin outline font:  {}", path.display()),
        None => println!("  Latin outline font:  none (bitmap fallback will be used)"),
    }
    match &report.cjk {
        Some(path) => println!("  CJK outline font:    {}", path.display()),
        None => println!("  CJK outline font:    none (CJK text will render as '?')"),
    }
    println!("  Bitmap fallback:     built-in 8x8 face, always available");

    Ok(())
}
