use anyhow::Context;
use cone_reconstruction::{
    PlyExport, ReconstructionInput, ReconstructionSettings, Reconstructor,
};
use log::*;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Clone)]
#[structopt(
    name = "cone-mapper",
    about = "Reconstructs the positions of an LED string wound around a cone-shaped object"
)]
struct Opt {
    /// The file containing the observations, camera poses, object height and point count.
    ///
    /// This is in the format of `cone_reconstruction::ReconstructionInput`.
    #[structopt(short, long)]
    input: PathBuf,
    /// The file where settings are specified.
    ///
    /// This is in the format of `cone_reconstruction::ReconstructionSettings`. Missing fields
    /// take their default values and a missing file uses the defaults for everything.
    #[structopt(short, long, default_value = "cone-settings.json")]
    settings: PathBuf,
    /// The file the reconstructed positions are written to.
    #[structopt(short, long, default_value = "led_positions.json")]
    output: PathBuf,
    /// Output PLY file to deposit the point cloud
    #[structopt(long)]
    ply: Option<PathBuf>,
    /// Run the surface continuity refinement regardless of the settings file
    #[structopt(long)]
    refine: bool,
    /// Print statistics about the reconstructed positions
    #[structopt(long)]
    stats: bool,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();

    let settings = File::open(&opt.settings)
        .ok()
        .and_then(|file| serde_json::from_reader(BufReader::new(file)).ok());
    if settings.is_some() {
        info!("loaded existing settings");
    } else {
        info!("used default settings");
    }
    let mut settings: ReconstructionSettings = settings.unwrap_or_default();
    if opt.refine {
        settings.enable_surface_refinement = true;
    }

    info!("loading observations from {}", opt.input.display());
    let input: ReconstructionInput = serde_json::from_reader(BufReader::new(
        File::open(&opt.input)
            .with_context(|| format!("unable to open {}", opt.input.display()))?,
    ))
    .with_context(|| format!("unable to parse {}", opt.input.display()))?;

    let output = Reconstructor::new(settings)
        .reconstruct(&input)
        .context("reconstruction failed")?;
    info!(
        "placed {} points from observations and predicted {}",
        output.metadata.num_observed, output.metadata.num_predicted
    );

    info!("saving the positions to {}", opt.output.display());
    let file = File::create(&opt.output)
        .with_context(|| format!("unable to create {}", opt.output.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &output)
        .with_context(|| format!("unable to write {}", opt.output.display()))?;

    if let Some(path) = &opt.ply {
        info!("exporting the point cloud to {}", path.display());
        let file = File::create(path)
            .with_context(|| format!("unable to create {}", path.display()))?;
        PlyExport::new()
            .write(
                BufWriter::new(file),
                &output.positions,
                &output.metadata.cameras,
            )
            .with_context(|| format!("unable to write {}", path.display()))?;
    }

    if opt.stats {
        println!("Object height: {:.2}m", output.metadata.tree_height);
        println!("Number of cameras: {}", output.metadata.num_cameras);
        println!(
            "Suspected reflections: {}",
            output.reflection_clusters.len()
        );
        print!("{}", output.statistics());
    }

    Ok(())
}
