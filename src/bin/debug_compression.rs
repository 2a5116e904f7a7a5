use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use media_compress_core::domains::compression::mapper::{format_file_size, CompressionLevel, MAX_LEVEL, MIN_LEVEL};
use media_compress_core::domains::compression::settings::CompressionSettings;
use media_compress_core::domains::core::file_storage_service::LocalFileStorageService;
use media_compress_core::domains::media::picker::{FileSystemPicker, MediaPicker, PickOutcome};
use media_compress_core::globals::build_compression_service;

fn usage() -> ! {
    eprintln!("Usage: debug_compression <file> [level 1-10] [--save]");
    eprintln!("   STORAGE_PATH sets the storage root (default ./storage)");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    let _ = env_logger::try_init();
    let _ = dotenv::dotenv();

    println!("🔍 Media Compression Debug Tool");
    println!("===============================");

    let args: Vec<String> = env::args().skip(1).collect();
    let save = args.iter().any(|arg| arg == "--save");
    let positional: Vec<&String> = args.iter().filter(|arg| !arg.starts_with("--")).collect();
    let Some(file) = positional.first() else { usage() };
    let level = match positional.get(1) {
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) => CompressionLevel::from_f64(value),
            Err(_) => usage(),
        },
        None => CompressionLevel::default(),
    };

    let storage_path = env::var("STORAGE_PATH").unwrap_or_else(|_| "./storage".to_string());
    println!("📁 Storage: {}", storage_path);
    let storage = Arc::new(LocalFileStorageService::new(&storage_path)?);
    let settings = CompressionSettings::from_env();
    let service = build_compression_service(storage, settings);

    print_level_table(service.as_ref());

    let picker = FileSystemPicker::new(Some(PathBuf::from(file.as_str())));
    let asset = match picker.pick_media().await? {
        PickOutcome::Selected(asset) => asset,
        PickOutcome::Cancelled => {
            println!("⏭️  Nothing selected");
            return Ok(());
        }
    };

    println!("\n📄 {}", asset.display_name.as_deref().unwrap_or(&asset.location));
    println!("   🎞️  Kind: {}", asset.kind);
    if let Some(size) = asset.byte_size {
        println!("   📏 Size: {}", format_file_size(size));
    }

    let info = service.level_info(level);
    println!("   🎚️  Level {} ({}), quality {}%", level, info.label, info.quality_percent);

    let result = match service.compress(&asset, level).await {
        Ok(result) => result,
        Err(e) => {
            println!("\n❌ {}", e.user_message());
            println!("   {}", e);
            std::process::exit(1);
        }
    };

    println!("\n✅ COMPRESSED in {} ms", result.duration_ms);
    println!("   📍 Output: {}", result.location);
    if result.ratio_computed() {
        println!(
            "   📏 Size: {} → {} ({}% saved)",
            format_file_size(result.original_byte_size),
            format_file_size(result.produced_byte_size),
            result.ratio_percent,
        );
        let saved = result.space_saved_bytes();
        if saved < 0 {
            println!("   ⚠️  Output is {} larger than the original", format_file_size(saved.unsigned_abs()));
        } else {
            println!("   💾 Space Saved: {}", format_file_size(saved as u64));
        }
    } else {
        println!("   📏 Size: unknown, ratio not computed");
    }

    if save {
        match service.save(&result.location, result.kind).await {
            Ok(destination) => println!("   💾 Saved to {}", destination.describe()),
            Err(e) => println!("   ❌ {}", e.user_message()),
        }
    }

    Ok(())
}

fn print_level_table(service: &dyn media_compress_core::domains::compression::service::CompressionService) {
    println!("\n📊 LEVELS");
    for value in MIN_LEVEL..=MAX_LEVEL {
        let info = service.level_info(CompressionLevel::new(value as i64));
        println!(
            "   {:>2}: quality {:>3}% | video {:>9} bps | {}",
            value, info.quality_percent, info.bitrate_bps, info.label
        );
    }
}
