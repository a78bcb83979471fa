//! fishgen - procedural stylized fish meshes from a handful of shape parameters
//!
//! Usage: `fishgen [config.ron] [--write-default-config]`

mod config;
mod export;

use anyhow::{Context, Result};
use config::FishgenConfig;
use fish_procgen::{FishGenerator, FishParams};
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config_path = None;
    let mut write_default = false;
    for arg in std::env::args().skip(1) {
        if arg == "--write-default-config" {
            write_default = true;
        } else {
            config_path = Some(PathBuf::from(arg));
        }
    }
    let path = config_path.unwrap_or_else(config::default_path);

    if write_default {
        FishgenConfig::default().save_to(&path);
        log::info!("Wrote default config to {:?}", path);
        return Ok(());
    }

    let config = FishgenConfig::load_from(&path);
    let base = config.fish_params();
    log::info!(
        "Generating {} fish ({}), base seed {}",
        config.count,
        config.preset.map_or("custom".to_string(), |p| format!("{:?}", p)),
        base.seed
    );

    if config.write_obj {
        std::fs::create_dir_all(&config.output_dir)
            .with_context(|| format!("creating output directory {:?}", config.output_dir))?;
    }

    for i in 0..config.count {
        let params = FishParams {
            seed: base.seed.wrapping_add(i as u64),
            ..base.clone()
        };
        let seed = params.seed;
        let mesh = FishGenerator::new(params)
            .generate()
            .with_context(|| format!("generating fish with seed {}", seed))?;

        log::info!(
            "fish {} (seed {}): {} vertices, {} triangles, watertight: {}",
            i,
            seed,
            mesh.vertex_count(),
            mesh.triangle_count(),
            mesh.is_watertight()
        );

        if config.write_obj {
            let file = config.output_dir.join(format!("fish_{:03}.obj", i));
            export::write_obj_file(&mesh, &file)?;
            log::info!("Wrote {:?}", file);
        }
    }

    Ok(())
}
