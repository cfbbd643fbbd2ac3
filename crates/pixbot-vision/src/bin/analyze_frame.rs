//! CLI tool to run the pixel classifiers over a saved screenshot.
//! Usage: cargo run -p pixbot-vision --features cli --bin analyze_frame -- <screenshot.png> [config.json] [output_dir]

use std::path::PathBuf;

use pixbot_capture::crop_region;
use pixbot_config::Config;
use pixbot_vision::{classify_potion, skill_is_available, slot_has_item, UiLayout};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <screenshot.png> [config.json] [output_dir]", args[0]);
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let config_path = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config/pixbot.json"));
    let output_dir = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./debug_output"));
    std::fs::create_dir_all(&output_dir)?;

    let config = Config::load(&config_path)?;
    let layout = UiLayout::new(&config);
    let t = &config.thresholds;

    println!("Loading image: {}", input_path.display());
    let img = image::open(&input_path)?.to_rgba8();
    println!("Image size: {}x{}", img.width(), img.height());

    println!("\n=== Belt ===");
    for column in 0..config.ui_pos.belt_columns {
        let region = layout.belt_slot(column);
        let crop = crop_region(&img, &region);
        println!(
            "  Column {}: {} (x={} y={})",
            column,
            classify_potion(&crop, t),
            region.x,
            region.y
        );
        crop.save(output_dir.join(format!("belt_{}.png", column)))?;
    }

    println!("\n=== Skill ===");
    let skill = crop_region(&img, &layout.skill_right());
    println!(
        "  Right skill available: {}",
        skill_is_available(&skill, t)
    );
    skill.save(output_dir.join("skill_right.png"))?;

    println!("\n=== Inventory ===");
    let grid = layout.inventory();
    let rows = config.ui_pos.inventory_rows;
    for row in 0..rows {
        let line: String = (0..10)
            .map(|column| {
                let cell = grid.cell(column, row);
                if slot_has_item(&grid.crop(&img, &cell), t) {
                    '#'
                } else {
                    '.'
                }
            })
            .collect();
        println!("  {}", line);
    }

    println!("\nCrops saved to {}", output_dir.display());
    Ok(())
}
