use std::{error::Error, fs, path::Path};

use rand::{rngs::StdRng, SeedableRng};
use rl_autoscale::{
    gym::{SyntheticService, SyntheticServiceConfig},
    ActionPolicy, AgentConfig, CapacitySpace, ScalingAgent, ScalingMode, State,
};

const NUM_TICKS: u64 = 5000;

fn main() -> Result<(), Box<dyn Error>> {
    let path = Path::new("demos/out");
    fs::create_dir_all(path)?;

    let mut wtr = csv::Writer::from_path(path.join("dyna_q_autoscaling.csv"))?;
    wtr.write_record(["tick", "policy", "instances", "cpu", "cost", "delta"])?;

    for policy in [ActionPolicy::EpsilonGreedy, ActionPolicy::Softmax] {
        let config = AgentConfig {
            mode: ScalingMode::HorizontalAndVertical,
            policy,
            gamma: 0.9,
            temperature: 0.5,
            seed: Some(7),
            ..Default::default()
        };
        let space = CapacitySpace::new(config.mode, 10, 4, 10)?;
        let initial = State::vertical(1, 0, 1);

        let mut service = SyntheticService::new(SyntheticServiceConfig::default(), &initial)?;
        let mut agent = ScalingAgent::dyna_q(config, space, initial)?;
        let mut rng = StdRng::seed_from_u64(7);

        let mut total_cost = 0.0;
        for tick in 0..NUM_TICKS {
            let action = agent.pick_action()?;
            let (cost, load) = service.step(&action, &mut rng);
            let delta = agent.update(&service, tick, cost, load)?;
            total_cost += cost;

            let state = agent.state();
            wtr.write_record(&[
                tick.to_string(),
                policy.to_string(),
                state.instances.to_string(),
                state.cpu.unwrap_or(1).to_string(),
                cost.to_string(),
                delta.to_string(),
            ])?;
        }

        println!(
            "{policy}: average cost {:.3}, final state {}",
            total_cost / NUM_TICKS as f64,
            agent.state()
        );
    }

    wtr.flush()?;
    Ok(())
}
