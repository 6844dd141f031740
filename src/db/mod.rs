pub mod ourairports;
pub mod prod_db;
