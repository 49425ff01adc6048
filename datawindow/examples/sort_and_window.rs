use datawindow::{FieldTable, ItemsRequest, codec};

#[derive(Debug)]
struct Details {
    category: &'static str,
}

#[derive(Debug)]
struct Product {
    name: &'static str,
    price: u32,
    details: Details,
}

fn main() {
    let details = FieldTable::<Details>::new().field("Category", |d| d.category.into());
    let fields = FieldTable::<Product>::new()
        .field("Name", |p| p.name.into())
        .field("Price", |p| p.price.into())
        .nested("Details", |p| &p.details, &details);

    let products = [
        ("lamp", 40, "home"),
        ("rake", 25, "garden"),
        ("mug", 8, "home"),
        ("hose", 25, "garden"),
        ("chair", 90, "home"),
    ]
    .map(|(name, price, category)| Product {
        name,
        price,
        details: Details { category },
    });

    // What a client would send as query-string parameters.
    let request = ItemsRequest::bind([
        ("startIndex", "1"),
        ("count", "3"),
        ("sortBy", "[Details.Category,Ascending][Price,Descending]"),
    ])
    .expect("valid request");

    println!("sort keys: {}", codec::serialize(&request.sort_keys));
    for product in fields.apply(&products, &request).expect("known fields") {
        println!(
            "{:<6} {:>3} {}",
            product.name, product.price, product.details.category
        );
    }
}
