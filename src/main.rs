use std::{
    fs::File,
    io::{BufWriter, Write},
    time::Instant,
};

use anyhow::{Context, Result};
use argh::FromArgs;
use flexi_logger::Logger;

use gfa2curves::{
    color::ColorScheme, decode_bytes, expand, reconstruct::RandomJitter,
    ForceLayout, LayoutEngine, Scene, Settings,
};

#[derive(Debug, FromArgs)]
/// Lay out a GFA graph and write its segments and links as OBJ polylines
pub struct Args {
    /// the GFA file to load
    #[argh(positional)]
    gfa_path: String,

    /// write the OBJ output here instead of stdout
    #[argh(option, short = 'o')]
    out: Option<String>,

    /// number of bases per sub-node
    #[argh(option, default = "1000")]
    chunk_size: usize,

    /// number of link constraint passes per tick
    #[argh(option, default = "3")]
    link_steps: usize,

    /// many-body strength, negative values repel
    #[argh(option, default = "-50.0")]
    strength: f32,

    /// approximation quality of the many-body force
    #[argh(option, default = "0.9")]
    theta: f32,

    /// number of simulation ticks
    #[argh(option, default = "300")]
    iterations: usize,

    /// segment color scheme, e.g. Rainbow, Viridis or JustGrey
    #[argh(option, default = "String::from(\"Rainbow\")")]
    color_scheme: String,

    /// draw links with a single curve instead of one per path
    #[argh(switch)]
    no_paths: bool,

    /// seed for the edge curve jitter
    #[argh(option)]
    seed: Option<u64>,

    /// log level, e.g. info or gfa2curves=debug; RUST_LOG takes precedence
    #[argh(option, default = "String::from(\"info\")")]
    log_level: String,
}

impl Args {
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings {
            chunk_size: self.chunk_size,
            link_steps: self.link_steps,
            strength: self.strength,
            theta: self.theta,
            iterations: self.iterations,
            color_scheme: ColorScheme::parse(&self.color_scheme)?,
            ..Settings::default()
        };
        settings.edge.draw_paths = !self.no_paths;
        Ok(settings)
    }
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();

    let _logger = Logger::try_with_env_or_str(&args.log_level)?.start()?;

    let settings = args.settings()?;

    let t0 = Instant::now();
    let bytes = std::fs::read(&args.gfa_path)
        .with_context(|| format!("reading {}", args.gfa_path))?;
    let graph = decode_bytes(&bytes);
    log::info!(
        "loaded {} segments, {} links, {} paths in {:.3} s",
        graph.nodes.len(),
        graph.links.len(),
        graph.paths.len(),
        t0.elapsed().as_secs_f64()
    );

    let render = expand(&graph, settings.chunk_size)?;

    let t0 = Instant::now();
    let mut engine = ForceLayout;
    let positions = engine.layout(&render, &settings.layout_params());
    log::info!(
        "layout of {} sub-nodes took {:.3} s",
        render.nodes.len(),
        t0.elapsed().as_secs_f64()
    );

    let mut jitter = match args.seed {
        Some(seed) => RandomJitter::from_seed(seed),
        None => RandomJitter::from_entropy(),
    };

    let scene =
        Scene::build(&graph, &render, &positions, &settings, &mut jitter);
    log::info!(
        "built {} segment shapes and {} link curves",
        scene.nodes.len(),
        scene.edges.len()
    );

    match &args.out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path))?;
            let mut out = BufWriter::new(file);
            scene.write_obj(&mut out, settings.curve_samples)?;
            out.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            scene.write_obj(&mut out, settings.curve_samples)?;
            out.flush()?;
        }
    }

    Ok(())
}
