pub mod category;
pub mod product;
pub mod record;
pub mod sales_order;
