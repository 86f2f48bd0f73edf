//! Reward catalogue listing

use anyhow::Result;

use tsc_core::RewardFunction;

pub async fn run() -> Result<()> {
    println!("Reward functions ({}):\n", RewardFunction::ALL.len());
    println!("{:<24} {:<56} {}", "NAME", "DESCRIPTION", "COMPONENTS");
    println!("{}", "-".repeat(120));

    for reward in RewardFunction::ALL {
        let components: Vec<String> = reward.components().iter().map(ToString::to_string).collect();
        println!(
            "{:<24} {:<56} {}",
            reward.as_str(),
            reward.description(),
            components.join(" + ")
        );
    }

    Ok(())
}
