use reaction_kinetics::prelude::*;

fn main() -> Result<(), NetworkError> {
    env_logger::init();

    // Substrate is released from a precursor and converted by an enzyme,
    // while the product slowly degrades
    let mut network = ReactionNetwork::builder()
        .reversible("Precursor <-> S", ("k_release", 0.4), ("k_bind", 0.05))
        .michaelis_menten("S + E -> E + P", [("Km", 2.0), ("kcat", 5.0)])
        .mass_action("P -> 0", [("k_deg", 0.02)])
        .initial_concentration("Precursor", 20.0)
        .initial_concentration("E", 0.1)
        .time((0..=10).map(|i| i as f64 * 10.0).collect())
        .build()?;

    network.integrate(Some(1e-8), Some(1e-10))?;
    print_table(&network);

    // Double the turnover number and compare
    network.update("kcat", 10.0)?;
    network.integrate(Some(1e-8), Some(1e-10))?;
    print_table(&network);

    if let Some(result) = network.to_result() {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).unwrap_or_default()
        );
    }

    Ok(())
}

fn print_table(network: &ReactionNetwork) {
    let Some(trajectory) = network.concentrations() else {
        return;
    };

    print!("{:>8}", "t");
    for species in network.species() {
        print!("{:>12}", species);
    }
    println!();

    for (i, t) in network.time().iter().enumerate() {
        print!("{:>8.1}", t);
        for value in trajectory.column(i) {
            print!("{:>12.4e}", value);
        }
        println!();
    }
    println!();
}
