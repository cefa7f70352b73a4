use solid_ldes::bucketing::{BucketIndex, Capacity, Member};
use solid_ldes::core::{vocab, PrefixTable, Term, Triple};
use solid_ldes::extraction::extract;
use solid_ldes::serialization::serialize;
use solid_ldes::{MemoryStorage, Publisher, PublisherConfig};
use std::time::Instant;

const STREAM: &str = "http://localhost:3000/stream/#EventStream";

/// Observations with a nested sensor description and a blank-node location each
fn synthetic_triples(number_resources: usize) -> Vec<Triple> {
    let mut triples = Vec::with_capacity(number_resources * 8);
    for i in 0..number_resources {
        let obs = Term::named(format!("http://example.org/obs{}", i));
        let sensor = Term::named(format!("http://example.org/sensor{}", i % 50));
        let location = Term::blank(format!("loc{}", i));
        let created = format!("2024-01-01T00:{:02}:{:02}Z", (i / 60) % 60, i % 60);

        let mut add = |s: &Term, p: &str, o: Term| triples.push(Triple::new(s.clone(), p, o));

        add(&obs, vocab::RDF_TYPE, Term::named("http://www.w3.org/ns/sosa/Observation"));
        add(&obs, vocab::DCT_CREATED, Term::typed_literal(created, vocab::XSD_DATE_TIME));
        add(&obs, "http://www.w3.org/ns/sosa/madeBySensor", sensor.clone());
        add(&obs, "http://example.org/location", location.clone());
        add(&location, "http://example.org/lat", Term::literal("51.05"));
        add(&location, "http://example.org/long", Term::literal("3.72"));
        add(&sensor, vocab::RDF_TYPE, Term::named("http://www.w3.org/ns/sosa/Sensor"));
        add(&sensor, "http://example.org/label", Term::literal(format!("sensor {}", i % 50)));
    }
    triples
}

fn benchmark_extraction(triples: &[Triple]) -> f64 {
    let start = Instant::now();
    let resources = extract(triples, vocab::DCT_CREATED, STREAM);
    let elapsed = start.elapsed();
    println!(
        " Extraction: {:.3} ms for {} resources",
        elapsed.as_secs_f64() * 1000.0,
        resources.len()
    );
    elapsed.as_secs_f64()
}

fn benchmark_serialization(triples: &[Triple]) -> f64 {
    let resources = extract(triples, vocab::DCT_CREATED, STREAM);
    let prefixes = PrefixTable::default_ldes()
        .extended_with([("ex", "http://example.org/"), ("sosa", "http://www.w3.org/ns/sosa/")])
        .unwrap();

    let start = Instant::now();
    let mut bytes = 0;
    for resource in &resources {
        bytes += serialize(resource, &prefixes).unwrap().len();
    }
    let elapsed = start.elapsed();
    println!(
        " Serialization: {:.3} ms, {:.1} KB written",
        elapsed.as_secs_f64() * 1000.0,
        bytes as f64 / 1000.0
    );
    elapsed.as_secs_f64()
}

fn benchmark_rebalance(number_members: i64, capacity: usize) -> f64 {
    let mut index = BucketIndex::new(0);
    for i in 0..number_members {
        index.add_member(Member::new(format!("m{}", i), i * 1000)).unwrap();
    }

    let start = Instant::now();
    let plan = index.rebalance(Capacity::Bounded(capacity));
    let elapsed = start.elapsed();
    println!(
        " Rebalance: {:.3} ms, {} buckets created, {} transfers",
        elapsed.as_secs_f64() * 1000.0,
        plan.created.len(),
        plan.transfers.len()
    );
    elapsed.as_secs_f64()
}

fn benchmark_publish(triples: &[Triple], capacity: usize) -> f64 {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let config = PublisherConfig {
        capacity: Some(capacity),
        ..PublisherConfig::new("http://localhost:3000/stream/")
    };

    let start = Instant::now();
    let report = runtime.block_on(async {
        let publisher = Publisher::new(MemoryStorage::new(), config).unwrap();
        let mut stream = publisher.initialize(1_704_067_200_000).await.unwrap();
        stream.append(triples).await.unwrap()
    });
    let elapsed = start.elapsed();
    println!(
        " Publish (memory storage): {:.3} ms, {} admitted",
        elapsed.as_secs_f64() * 1000.0,
        report.admitted.len()
    );
    elapsed.as_secs_f64()
}

fn main() {
    println!("Publish Benchmark");
    println!("=================");

    for number_resources in [100, 1_000, 3_600] {
        println!("\n{} resources", number_resources);
        let triples = synthetic_triples(number_resources);

        let extraction = benchmark_extraction(&triples);
        let serialization = benchmark_serialization(&triples);
        benchmark_rebalance(number_resources as i64, 100);
        benchmark_publish(&triples, 100);

        println!(
            " Throughput: {:.0} resources/sec extracted, {:.0} resources/sec serialized",
            number_resources as f64 / extraction,
            number_resources as f64 / serialization
        );
    }
}
