use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashMap;
use std::time::Duration;

use aws_sdk_dynamodb::types::AttributeValue;
use mess_menu::models::{MessMenu, MessType};
use mess_menu::repositories::{attribute_to_json, item_to_document};

const MEALS: [&str; 4] = ["breakfast", "lunch", "snacks", "dinner"];

fn day_item(day: &str, dishes_per_meal: usize) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    item.insert("id".to_string(), AttributeValue::S(day.to_string()));

    for meal in MEALS {
        let dishes = (0..dishes_per_meal)
            .map(|i| {
                AttributeValue::M(HashMap::from([
                    ("name".to_string(), AttributeValue::S(format!("{} dish {}", meal, i))),
                    ("calories".to_string(), AttributeValue::N(format!("{}", 120 + i * 15))),
                    ("veg".to_string(), AttributeValue::Bool(i % 2 == 0)),
                ]))
            })
            .collect();
        item.insert(meal.to_string(), AttributeValue::L(dishes));
    }

    item
}

fn bench_attribute_to_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("attribute_to_json");
    group.measurement_time(Duration::from_secs(5));

    for dishes in [2, 8, 32].iter() {
        let value = AttributeValue::M(day_item("Monday", *dishes));
        group.bench_with_input(BenchmarkId::new("dishes_per_meal", dishes), &value, |b, value| {
            b.iter(|| attribute_to_json(black_box(value)))
        });
    }

    group.finish();
}

fn bench_week_menu(c: &mut Criterion) {
    let days = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];
    let items: Vec<_> = days.iter().map(|day| day_item(day, 6)).collect();

    c.bench_function("week_menu_from_items", |b| {
        b.iter(|| {
            let documents = items
                .iter()
                .cloned()
                .map(|item| item_to_document("MensVeg", "id", item))
                .collect::<Result<Vec<_>, _>>()
                .unwrap();
            MessMenu::from_documents(MessType::MensVeg, black_box(documents)).to_response()
        })
    });
}

criterion_group!(benches, bench_attribute_to_json, bench_week_menu);
criterion_main!(benches);
