//! Klang Valley delivery locations for realistic test fixtures.
//!
//! Coordinates are approximate neighbourhood centres around the HQ depot.

use batch_planner::model::{Coordinate, Order, OrderDetails, TimeWindow};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// BloomThis HQ, Petaling Jaya.
pub const HQ: Location = Location::new("BloomThis HQ", 3.100240985840765, 101.63122341164973);

/// Neighbourhoods within a few hundred metres of HQ.
pub const NEAR_HQ: &[Location] = &[
    Location::new("Jalan 19/1", 3.1021, 101.6320),
    Location::new("Jalan 17/1", 3.0990, 101.6330),
    Location::new("Jalan 16/11", 3.1010, 101.6295),
];

pub const KLANG_VALLEY: &[Location] = &[
    Location::new("Petaling Jaya", 3.1073, 101.6067),
    Location::new("Bangsar", 3.1300, 101.6710),
    Location::new("Damansara", 3.1500, 101.6200),
    Location::new("Subang Jaya", 3.0438, 101.5806),
    Location::new("Mont Kiara", 3.1700, 101.6500),
    Location::new("Kepong", 3.2100, 101.6400),
    Location::new("Cheras", 3.0900, 101.7400),
    Location::new("Shah Alam", 3.0738, 101.5183),
    Location::new("Ampang", 3.1500, 101.7600),
    Location::new("Puchong", 3.0300, 101.6200),
    Location::new("Cyberjaya", 2.9213, 101.6559),
    Location::new("Rawang", 3.3200, 101.5750),
];

/// 2024-01-15 12:00 UTC.
pub const NOON: i64 = 1_705_320_000;
pub const HOUR: i64 = 3600;

/// Builder for test orders with the default 12:00-16:00 window.
#[derive(Debug, Clone)]
pub struct TestOrder {
    order: Order,
}

impl TestOrder {
    pub fn new(id: &str) -> Self {
        Self {
            order: Order::new(
                id,
                format!("{} destination", id),
                HQ.coordinate(),
                TimeWindow::new(NOON, NOON + 4 * HOUR),
            ),
        }
    }

    pub fn at(mut self, location: &Location) -> Self {
        self.order.destination = location.name.to_string();
        self.order.coordinate = location.coordinate();
        self
    }

    pub fn coordinate(mut self, lat: f64, lng: f64) -> Self {
        self.order.coordinate = Coordinate::new(lat, lng);
        self
    }

    pub fn window(mut self, start: i64, end: i64) -> Self {
        self.order.window = TimeWindow::new(start, end);
        self
    }

    pub fn product(mut self, product_id: &str) -> Self {
        self.order.details = OrderDetails {
            order_number: Some(format!("BT-2401-{}", self.order.id)),
            product_id: Some(product_id.to_string()),
            ..OrderDetails::default()
        };
        self
    }

    pub fn build(self) -> Order {
        self.order
    }
}
