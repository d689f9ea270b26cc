#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price_cents: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductDto {
    pub id: u32,
    pub title: String,
    pub price: String,
}
