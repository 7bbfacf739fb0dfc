use time::Date;

use crate::sales::{Columns, Dataset, SalesRecord};

impl SalesRecord {
    /// A record with the given date, region and sales and placeholder values
    /// for everything else.
    pub(crate) fn build(order_date: Date, region: &str, sales: f64) -> Self {
        Self {
            order_date: Some(order_date),
            region: region.to_owned(),
            state: "New York".to_owned(),
            city: "New York City".to_owned(),
            category: "Furniture".to_owned(),
            sub_category: "Chairs".to_owned(),
            sales,
            profit: 0.0,
            quantity: 1,
        }
    }

    pub(crate) fn state(mut self, state: &str) -> Self {
        self.state = state.to_owned();
        self
    }

    pub(crate) fn city(mut self, city: &str) -> Self {
        self.city = city.to_owned();
        self
    }

    pub(crate) fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    pub(crate) fn sub_category(mut self, sub_category: &str) -> Self {
        self.sub_category = sub_category.to_owned();
        self
    }

    pub(crate) fn profit(mut self, profit: f64) -> Self {
        self.profit = profit;
        self
    }

    pub(crate) fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub(crate) fn no_date(mut self) -> Self {
        self.order_date = None;
        self
    }
}

/// A dataset with every column present.
pub(crate) fn dataset(records: Vec<SalesRecord>) -> Dataset {
    Dataset::new(records, Columns::all())
}

/// A small dataset spanning two years, four regions and three categories.
pub(crate) fn superstore_sample() -> Dataset {
    use time::macros::date;

    dataset(vec![
        SalesRecord::build(date!(2022 - 11 - 08), "South", 261.96)
            .state("Kentucky")
            .city("Henderson")
            .category("Furniture")
            .sub_category("Bookcases")
            .profit(41.9136)
            .quantity(2),
        SalesRecord::build(date!(2022 - 11 - 08), "South", 731.94)
            .state("Kentucky")
            .city("Henderson")
            .category("Furniture")
            .sub_category("Chairs")
            .profit(219.582)
            .quantity(3),
        SalesRecord::build(date!(2022 - 06 - 12), "West", 14.62)
            .state("California")
            .city("Los Angeles")
            .category("Office Supplies")
            .sub_category("Labels")
            .profit(6.8714)
            .quantity(2),
        SalesRecord::build(date!(2023 - 01 - 05), "East", 100.0)
            .state("New York")
            .city("New York City")
            .category("Technology")
            .sub_category("Phones")
            .profit(12.5)
            .quantity(1),
        SalesRecord::build(date!(2023 - 02 - 10), "West", 50.0)
            .state("California")
            .city("San Francisco")
            .category("Office Supplies")
            .sub_category("Paper")
            .profit(-3.0)
            .quantity(5),
        SalesRecord::build(date!(2023 - 02 - 21), "Central", 22.5)
            .state("Texas")
            .city("Houston")
            .category("Furniture")
            .sub_category("Chairs")
            .profit(-1.25)
            .quantity(4),
    ])
}
