#![warn(rust_2018_idioms)]

//! Command line front end that prints canonical forms of
//! graphs read from a file or stdin.

use clap::Parser;

use sgcanon::{
    automorphism::AutomorphismAccumulator,
    canonicalize, codec,
    debug::{print_generator, print_orbits_nauty_style},
    do_if_some, log_time,
    statistics::{GraphStatistics, Statistics},
    time, Canonical, Error, IsomorphismFilter, Settings,
};

mod input;
use input::{read_graphs, Args, InputGraph};

#[cfg(not(tarpaulin_include))]
fn report(canonical: &Canonical, args: &Args) -> Option<usize> {
    if args.orbits {
        print_orbits_nauty_style(&canonical.orbits, Some(canonical.statistics.search_time));
    }

    if args.generators {
        canonical.generators.iter().for_each(print_generator);
    }

    if args.search_group {
        let mut accumulator = AutomorphismAccumulator::new(canonical.labelling.len());
        for generator in canonical.generators.iter().cloned() {
            accumulator.add_generator(generator);
        }

        let elements = accumulator.group_elements(args.group_limit);
        elements.iter().for_each(print_generator);
        if elements.len() >= args.group_limit {
            log::warn!(
                "Group enumeration stopped after {} elements",
                args.group_limit
            );
        }
        Some(elements.len())
    } else {
        None
    }
}

#[cfg(not(tarpaulin_include))]
fn handle_graph(
    input: InputGraph,
    args: &Args,
    settings: &Settings,
    filter: &mut Option<IsomorphismFilter>,
    statistics: &mut Option<Statistics>,
) -> Result<(), Error> {
    let InputGraph { graph, colours } = input;
    let settings = Settings {
        colours,
        ..settings.clone()
    };

    time!(canonical_time, canonical, canonicalize(&graph, &settings));
    let canonical = canonical?;
    log::info!(
        "Canonicalized {} vertices in {:?}, group size {}",
        graph.order(),
        canonical_time,
        canonical.group_size
    );

    if let Some(filter) = filter {
        if !filter.is_new(&canonical) {
            log::debug!("Skipping a duplicate of {}", canonical.encoded);
            return Ok(());
        }
    }

    let encoded = codec::encode(&canonical.canonical_adjacency, args.output)?;
    if args.unique_id {
        println!("{}\t{}", encoded, canonical.unique_id());
    } else {
        println!("{}", encoded);
    }

    let group_elements = report(&canonical, args);

    do_if_some(statistics, |st| {
        st.log_graph_statistic(GraphStatistics {
            order: graph.order(),
            edges: graph.number_of_edges(),
            group_size: canonical.group_size,
            number_of_orbits: canonical.number_of_orbits,
            group_elements,
            search: canonical.statistics.clone(),
        })
    });

    Ok(())
}

#[cfg(not(tarpaulin_include))]
fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let settings = args.settings()?;
    let mut statistics = args.statistics();

    log_time!("Reading the input", graphs, read_graphs(&args));
    let graphs = graphs?;
    do_if_some(&mut statistics, Statistics::log_read_done);
    log::info!("Read {} graph(s)", graphs.len());

    let mut filter = if args.dedup {
        Some(IsomorphismFilter::default())
    } else {
        None
    };
    for graph in graphs {
        handle_graph(graph, &args, &settings, &mut filter, &mut statistics)?;
    }
    do_if_some(&mut filter, |filter| {
        log::info!("{} isomorphism classes", filter.len())
    });

    if let Some(mut statistics) = statistics {
        statistics.log_end();
        statistics.save_statistics()?;
    }

    Ok(())
}
