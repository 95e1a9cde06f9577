use clap::{Parser, Subcommand};
use cityview_client::{LiveSource, SimulationClient, SnapshotSource};
use cityview_common::{EntityId, EntityKind, GridExtent, ViewerConfig};
use cityview_render::{DebugTextRenderer, RenderView, Renderer};
use cityview_scene::{KindSnapshot, SceneConfig, SceneState, SnapshotRecord};
use cityview_tools::SceneInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cityview-cli", about = "Headless tools for the city viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective default configuration
    Info,
    /// Connect to a simulation server, poll a few cycles, and print the scene
    Probe {
        /// Simulation server URL
        #[arg(long, default_value = "http://localhost:8586")]
        server_url: String,
        /// Number of agents requested at init
        #[arg(long, default_value = "5")]
        agents: u32,
        /// Poll cycles to run
        #[arg(short, long, default_value = "3")]
        cycles: u32,
    },
    /// Run synthetic snapshots through the scene and show interpolation
    Replay {
        /// Frames to advance per snapshot span
        #[arg(short, long, default_value = "12")]
        frames: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("cityview-cli v{}", env!("CARGO_PKG_VERSION"));
            let config = ViewerConfig::default();
            println!("server_url: {}", config.server_url);
            println!("agents: {}", config.agents);
            println!("grid: {}x{}", config.grid_width, config.grid_height);
            println!("poll_every_frames: {}", config.poll_every_frames);
            println!("interpolation_ms: {}", config.interpolation_ms);
            println!("max_delta_ms: {}", config.max_delta_ms);
        }
        Commands::Probe {
            server_url,
            agents,
            cycles,
        } => {
            let client = SimulationClient::new(&server_url);
            let requested = GridExtent::default();
            let extent = client.init(agents, requested)?;
            println!("Server initialized: grid {}x{}", extent.width, extent.height);

            let mut scene = SceneState::new(extent, SceneConfig::default());
            let mut source = LiveSource::new(client);
            for snap in &source.bootstrap()? {
                scene.apply_snapshot(snap);
            }
            println!("{}", SceneInspector::summary(&scene));

            let renderer = DebugTextRenderer::new();
            for cycle in 1..=cycles {
                let snapshots = source.poll()?;
                for snap in &snapshots {
                    scene.apply_snapshot(snap);
                }
                // Settle the span so printed positions are the new targets.
                scene.advance(1000.0);
                println!("--- cycle {cycle} ---");
                print!("{}", renderer.render(&scene, &RenderView::default()));
            }
        }
        Commands::Replay { frames } => {
            let mut scene = SceneState::new(GridExtent::default(), SceneConfig::default());
            let id = EntityId(1);

            scene.apply_snapshot(&KindSnapshot::new(
                EntityKind::Vehicle,
                1,
                vec![SnapshotRecord::at(1, 0.0, 1.0, 0.0)],
            ));
            scene.apply_snapshot(&KindSnapshot::new(
                EntityKind::Vehicle,
                2,
                vec![SnapshotRecord::at(1, 8.0, 1.0, 4.0)],
            ));

            println!("Vehicle {id}: interpolating across one snapshot span");
            let step_ms = 200.0 / frames as f32;
            for frame in 0..=frames {
                let e = scene
                    .get(EntityKind::Vehicle, id)
                    .expect("vehicle is live");
                println!(
                    "frame {frame:>3}: pos=({:.3}, {:.3}, {:.3}) progress={:.2}",
                    e.current.x, e.current.y, e.current.z, e.progress
                );
                scene.advance(step_ms);
            }

            let e = scene.get(EntityKind::Vehicle, id).expect("vehicle is live");
            println!(
                "settled: current == target: {}",
                if e.current == e.target { "OK" } else { "MISMATCH" }
            );
        }
    }

    Ok(())
}
