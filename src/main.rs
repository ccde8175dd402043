//! Pizza Cut entry point
//!
//! Plays one round against itself and prints the cuts as JSON.
//!
//! Usage: `pizza-cut [categories] [seed]` or `pizza-cut --config <file.json>`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Pizza Cut (native) starting...");

    if let Err(e) = native::run(std::env::args().skip(1).collect()) {
        log::error!("{}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the product on the web; nothing to run here
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use pizza_cut::consts::PIZZAS_PER_ROUND;
    use pizza_cut::engine::dominance_tally;
    use pizza_cut::{EngineConfig, EngineError, Player};
    use serde::Serialize;

    #[derive(Serialize)]
    struct CutSummary {
        customer: usize,
        pizza_id: usize,
        center: [f64; 2],
        angle: f64,
        target: [Vec<f64>; 2],
        achieved: [Vec<f64>; 2],
        error: f64,
        improvement: f64,
    }

    #[derive(Serialize)]
    struct RoundSummary {
        config: EngineConfig,
        dominance: Vec<usize>,
        cuts: Vec<CutSummary>,
        total_error: f64,
        total_improvement: f64,
    }

    fn parse_config(args: &[String]) -> Result<EngineConfig, EngineError> {
        match args {
            [flag, path] if flag == "--config" => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| EngineError::invalid(format!("cannot read {path}: {e}")))?;
                EngineConfig::from_json(&json)
            }
            _ => {
                let number = |i: usize, default: u64| -> Result<u64, EngineError> {
                    args.get(i).map_or(Ok(default), |s| {
                        s.parse()
                            .map_err(|_| EngineError::invalid(format!("expected a number, got {s:?}")))
                    })
                };
                let config = EngineConfig {
                    seed: number(1, 0)?,
                    ..EngineConfig::for_categories(number(0, 2)? as usize)
                };
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn run(args: Vec<String>) -> Result<(), EngineError> {
        let config = parse_config(&args)?;
        let mut player = Player::new(config.clone())?;

        let pizzas = player.layout_pizzas()?;
        let prefs = player.generate_preferences(PIZZAS_PER_ROUND, None)?;

        let mut remaining: Vec<usize> = (0..pizzas.len()).collect();
        let mut cuts = Vec::with_capacity(prefs.len());
        for (customer, target) in prefs.iter().enumerate() {
            let choice = player.choose_cut(&pizzas, &remaining, target, None)?;
            let report = player.score(&pizzas[choice.pizza_id], &choice.cut, target)?;
            remaining.retain(|&id| id != choice.pizza_id);

            cuts.push(CutSummary {
                customer,
                pizza_id: choice.pizza_id,
                center: choice.cut.center.to_array(),
                angle: choice.cut.angle,
                target: [target[0].amounts().to_vec(), target[1].amounts().to_vec()],
                achieved: report.achieved,
                error: report.total_error,
                improvement: report.improvement,
            });
        }

        let total_error = cuts.iter().map(|c| c.error).sum();
        let total_improvement = cuts.iter().map(|c| c.improvement).sum();
        log::info!(
            "Round done: {} cuts, total error {:.3}, improvement {:.3}",
            cuts.len(),
            total_error,
            total_improvement
        );

        let summary = RoundSummary {
            dominance: dominance_tally(&prefs, player.categories()),
            config,
            cuts,
            total_error,
            total_improvement,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}
