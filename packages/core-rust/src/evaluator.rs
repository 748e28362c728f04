//! Query evaluation: `(collection, QueryDescriptor) -> QueryResult`.
//!
//! Evaluation is pure and total. Malformed page numbers and sizes are
//! clamped, unknown sort keys were already mapped to name-ascending when the
//! descriptor was parsed, and nothing here performs I/O or suspends.
//!
//! Steps, in order: extract categories from the whole collection, filter,
//! stable sort, paginate with the effective-page policy.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::trace;

use crate::query::{QueryDescriptor, SortKey};
use crate::result::QueryResult;
use crate::types::Item;

/// Evaluates `query` against `collection`.
#[must_use]
pub fn evaluate(collection: &[Item], query: &QueryDescriptor) -> QueryResult {
    let categories = distinct_categories(collection);

    let needle = query.search_text.to_lowercase();
    let mut filtered: Vec<&Item> = collection
        .iter()
        .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(&needle))
        .filter(|item| query.category.matches(&item.category))
        .collect();

    // `sort_by` is stable, so equal keys keep collection order.
    filtered.sort_by(|a, b| compare(query.sort, a, b));

    let page_size = query.effective_page_size();
    let total_items = filtered.len();
    let total_pages = total_pages(total_items, page_size);
    let page = query.requested_page().min(total_pages);

    trace!(total_items, total_pages, page, page_size, "query evaluated");

    let start = (page - 1) * page_size;
    let items = filtered
        .into_iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    QueryResult {
        items,
        page,
        page_size,
        total_items,
        total_pages,
        categories,
    }
}

/// Sorted distinct categories of `collection`.
#[must_use]
pub fn distinct_categories(collection: &[Item]) -> Vec<String> {
    collection
        .iter()
        .map(|item| item.category.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// `max(1, ceil(total_items / page_size))`, with `page_size` below 1 treated as 1.
#[must_use]
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(1)
}

fn compare(sort: SortKey, a: &Item, b: &Item) -> Ordering {
    match sort {
        SortKey::NameAsc => compare_names(&a.name, &b.name),
        SortKey::NameDesc => compare_names(&b.name, &a.name),
        SortKey::PriceAsc => a.price.total_cmp(&b.price),
        SortKey::PriceDesc => b.price.total_cmp(&a.price),
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::query::CategoryFilter;

    fn item(id: &str, name: &str, price: f64, category: &str) -> Item {
        Item {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("About {name}"),
            price,
            category: category.to_string(),
            stock: 3,
            image: None,
        }
    }

    fn numbered(count: usize) -> Vec<Item> {
        (0..count)
            .map(|i| item(&format!("p{i:02}"), &format!("Product {i:02}"), 10.0, "Misc"))
            .collect()
    }

    fn sample() -> Vec<Item> {
        vec![
            item("1", "Walnut Monitor Stand", 89.0, "Home Office"),
            item("2", "aurora Desk Lamp", 45.5, "Home Office"),
            item("3", "Cast Iron Skillet", 39.0, "Kitchen"),
            item("4", "Trail Daypack", 45.5, "Outdoors"),
            item("5", "Ceramic Pour-Over", 24.0, "Kitchen"),
            item("6", "Bamboo Cutting Board", 24.0, "Kitchen"),
        ]
    }

    fn names(result: &QueryResult) -> Vec<&str> {
        result.items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn single_item_search_scenario() {
        let collection = vec![item("a1", "Aurora Desk Lamp", 45.0, "Home Office")];
        let query = QueryDescriptor::default().with_search_text("aurora");
        let result = evaluate(&collection, &query);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.total_items, 1);
        assert_eq!(result.total_pages, 1);
    }

    #[test]
    fn third_page_of_twenty_five() {
        let query = QueryDescriptor::default().with_page(3);
        let result = evaluate(&numbered(25), &query);
        assert_eq!(result.items.len(), 5);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.page, 3);
        assert_eq!(result.items[0].id, "p20");
    }

    #[test]
    fn absent_category_yields_empty_page_with_all_categories() {
        let query = QueryDescriptor::default().with_category("Lighting");
        let result = evaluate(&sample(), &query);
        assert!(result.items.is_empty());
        assert_eq!(result.total_items, 0);
        assert_eq!(result.total_pages, 1);
        assert_eq!(result.page, 1);
        assert_eq!(result.categories, vec!["Home Office", "Kitchen", "Outdoors"]);
    }

    #[test]
    fn empty_collection() {
        let result = evaluate(&[], &QueryDescriptor::default().with_page(9));
        assert!(result.items.is_empty());
        assert_eq!(result.total_items, 0);
        assert_eq!(result.total_pages, 1);
        assert_eq!(result.page, 1);
        assert!(result.categories.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring_of_name() {
        let result = evaluate(&sample(), &QueryDescriptor::default().with_search_text("DESK"));
        assert_eq!(names(&result), vec!["aurora Desk Lamp"]);

        let result = evaluate(&sample(), &QueryDescriptor::default().with_search_text("about"));
        assert!(result.items.is_empty(), "description must not be searched");
    }

    #[test]
    fn category_filter_combines_with_search() {
        let query = QueryDescriptor::default()
            .with_category(CategoryFilter::Exact("Kitchen".into()))
            .with_search_text("c");
        let result = evaluate(&sample(), &query);
        assert_eq!(
            names(&result),
            vec!["Bamboo Cutting Board", "Cast Iron Skillet", "Ceramic Pour-Over"]
        );
    }

    #[test]
    fn name_sort_ignores_case() {
        let result = evaluate(&sample(), &QueryDescriptor::default());
        assert_eq!(
            names(&result),
            vec![
                "aurora Desk Lamp",
                "Bamboo Cutting Board",
                "Cast Iron Skillet",
                "Ceramic Pour-Over",
                "Trail Daypack",
                "Walnut Monitor Stand",
            ]
        );
        let desc = evaluate(&sample(), &QueryDescriptor::default().with_sort(SortKey::NameDesc));
        assert_eq!(names(&desc)[0], "Walnut Monitor Stand");
        assert_eq!(names(&desc)[5], "aurora Desk Lamp");
    }

    #[test]
    fn price_sort_is_stable_in_both_directions() {
        let asc = evaluate(&sample(), &QueryDescriptor::default().with_sort(SortKey::PriceAsc));
        let ids: Vec<&str> = asc.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "6", "3", "2", "4", "1"]);

        let desc = evaluate(&sample(), &QueryDescriptor::default().with_sort(SortKey::PriceDesc));
        let ids: Vec<&str> = desc.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "4", "3", "5", "6"]);
    }

    #[test]
    fn equal_names_keep_collection_order() {
        let collection = vec![
            item("x", "Mug", 1.0, "Kitchen"),
            item("y", "Mug", 2.0, "Kitchen"),
            item("z", "Mug", 3.0, "Kitchen"),
        ];
        for sort in [SortKey::NameAsc, SortKey::NameDesc] {
            let result = evaluate(&collection, &QueryDescriptor::default().with_sort(sort));
            let ids: Vec<&str> = result.items.iter().map(|i| i.id.as_str()).collect();
            assert_eq!(ids, vec!["x", "y", "z"]);
        }
    }

    #[test]
    fn out_of_range_pages_are_clamped() {
        let collection = numbered(25);
        let first = evaluate(&collection, &QueryDescriptor::default());
        for page in [0, -1, -100] {
            let result = evaluate(&collection, &QueryDescriptor::default().with_page(page));
            assert_eq!(result, first);
        }
        let last = evaluate(&collection, &QueryDescriptor::default().with_page(10_000));
        assert_eq!(last.page, 3);
        assert_eq!(last.items.len(), 5);
    }

    #[test]
    fn page_size_below_one_is_one() {
        let query = QueryDescriptor {
            page_size: 0,
            page: 2,
            ..QueryDescriptor::default()
        };
        let result = evaluate(&numbered(3), &query);
        assert_eq!(result.page_size, 1);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].id, "p01");
    }

    #[test]
    fn total_pages_rounds_up_with_floor_of_one() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 5);
    }

    // ---- Properties ----

    const CATEGORIES: [&str; 4] = ["Audio", "Decor", "Kitchen", "Outdoors"];

    fn arb_item() -> impl Strategy<Value = Item> {
        ("[a-zA-Z ]{0,12}", 0u32..500, 0usize..CATEGORIES.len()).prop_map(|(name, cents, cat)| {
            Item {
                id: String::new(),
                name,
                description: String::new(),
                price: f64::from(cents) / 4.0,
                category: CATEGORIES[cat].to_string(),
                stock: 0,
                image: None,
            }
        })
    }

    fn arb_collection() -> impl Strategy<Value = Vec<Item>> {
        prop::collection::vec(arb_item(), 0..60).prop_map(|mut items| {
            for (i, item) in items.iter_mut().enumerate() {
                item.id = format!("id-{i}");
            }
            items
        })
    }

    fn arb_query() -> impl Strategy<Value = QueryDescriptor> {
        (
            "[a-zA-Z]{0,2}",
            prop::option::of(0usize..CATEGORIES.len() + 1),
            0usize..SortKey::ALL.len(),
            -3i64..12,
            -2i64..15,
        )
            .prop_map(|(search_text, cat, sort, page, page_size)| QueryDescriptor {
                search_text,
                category: match cat {
                    None => CategoryFilter::All,
                    Some(i) => CategoryFilter::Exact(
                        CATEGORIES.get(i).copied().unwrap_or("Lighting").to_string(),
                    ),
                },
                sort: SortKey::ALL[sort],
                page,
                page_size,
            })
    }

    proptest! {
        #[test]
        fn page_is_always_within_bounds(items in arb_collection(), query in arb_query()) {
            let result = evaluate(&items, &query);
            prop_assert!(result.total_pages >= 1);
            prop_assert!(result.page >= 1 && result.page <= result.total_pages);
            prop_assert_eq!(result.total_pages, total_pages(result.total_items, result.page_size));
        }

        #[test]
        fn pages_are_full_except_the_last(items in arb_collection(), query in arb_query()) {
            let result = evaluate(&items, &query);
            prop_assert!(result.items.len() <= result.page_size);
            if result.page < result.total_pages {
                prop_assert_eq!(result.items.len(), result.page_size);
            }
        }

        #[test]
        fn evaluation_is_deterministic(items in arb_collection(), query in arb_query()) {
            prop_assert_eq!(evaluate(&items, &query), evaluate(&items, &query));
        }

        #[test]
        fn categories_ignore_the_query(items in arb_collection(), query in arb_query()) {
            let result = evaluate(&items, &query);
            prop_assert_eq!(result.categories, distinct_categories(&items));
        }

        #[test]
        fn sort_is_stable(items in arb_collection(), sort in 0usize..SortKey::ALL.len()) {
            let sort = SortKey::ALL[sort];
            let query = QueryDescriptor {
                sort,
                page_size: 1_000,
                ..QueryDescriptor::default()
            };
            let result = evaluate(&items, &query);
            let position = |id: &str| items.iter().position(|i| i.id == id).unwrap();
            for pair in result.items.windows(2) {
                if compare(sort, &pair[0], &pair[1]) == Ordering::Equal {
                    prop_assert!(position(&pair[0].id) < position(&pair[1].id));
                } else {
                    prop_assert_eq!(compare(sort, &pair[0], &pair[1]), Ordering::Less);
                }
            }
        }

        #[test]
        fn non_positive_page_matches_first_page(items in arb_collection(), page in -50i64..=0) {
            let base = QueryDescriptor::default();
            prop_assert_eq!(
                evaluate(&items, &base.clone().with_page(page)),
                evaluate(&items, &base)
            );
        }
    }
}
