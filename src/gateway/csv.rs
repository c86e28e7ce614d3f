use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use super::PersistenceGateway;
use crate::domain::{Order, OrderId, OrderStatus, Product, ProductId, User};
use crate::error::GatewayError;

const PRODUCTS_FILE: &str = "products.csv";
const ORDERS_FILE: &str = "orders.csv";
const USER_FILE: &str = "user.csv";

const PRODUCTS_HEADER: &str = "ID,Name,Description,Price,Stock Level";
const ORDERS_HEADER: &str = "Order ID,Product IDs,Total Price,Status";
const USER_HEADER: &str = "id,name,phoneNumber,deliveryAddress,avatar";

/// Flat-file gateway. Each record kind lives in its own CSV file with a
/// header row; saves rewrite the file in full.
#[derive(Debug, Clone)]
pub struct CsvGateway {
    dir: PathBuf,
}

impl CsvGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Data records of `file`, header excluded, each with the line it starts
    /// on. `None` when the file cannot be read.
    fn rows(&self, file: &str) -> Option<Vec<Record>> {
        let path = self.path(file);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No existing file");
                return None;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unable to read file");
                return None;
            }
        };

        Some(split_records(&contents).into_iter().skip(1).collect())
    }

    fn write(&self, file: &str, contents: &str) -> Result<(), GatewayError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(file);
        let tmp = path.with_extension("csv.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl PersistenceGateway for CsvGateway {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    fn load_products(&self) -> Vec<Product> {
        let products: Vec<Product> = self
            .rows(PRODUCTS_FILE)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(line, fields)| skip_malformed(fields.and_then(|fields| parse_product(line, fields))))
            .collect();
        info!(count = products.len(), "Products loaded");
        products
    }

    #[instrument(skip(self, products), fields(count = products.len()))]
    fn save_products(&self, products: &[Product]) -> Result<(), GatewayError> {
        let mut contents = format!("{}\n", PRODUCTS_HEADER);
        for product in products {
            contents.push_str(&format!(
                "{},{},{},{},{}\n",
                product.id,
                quote(&product.name),
                quote(&product.description),
                product.price,
                product.stock_level
            ));
        }
        self.write(PRODUCTS_FILE, &contents)
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    fn load_orders(&self) -> HashMap<OrderId, Order> {
        let orders: HashMap<OrderId, Order> = self
            .rows(ORDERS_FILE)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(line, fields)| skip_malformed(fields.and_then(|fields| parse_order(line, fields))))
            .map(|order| (order.id, order))
            .collect();
        info!(count = orders.len(), "Orders loaded");
        orders
    }

    #[instrument(skip(self, orders), fields(count = orders.len()))]
    fn save_orders(&self, orders: &[Order]) -> Result<(), GatewayError> {
        let mut contents = format!("{}\n", ORDERS_HEADER);
        for order in orders {
            let units: Vec<String> = order.expand_units().iter().map(ToString::to_string).collect();
            contents.push_str(&format!(
                "{},{},{},{}\n",
                order.id,
                units.join(";"),
                order.total_price,
                order.status
            ));
        }
        self.write(ORDERS_FILE, &contents)
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    fn load_user(&self) -> Option<User> {
        let (line, fields) = self.rows(USER_FILE)?.into_iter().next()?;
        skip_malformed(fields.and_then(|fields| parse_user(line, fields)))
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    fn save_user(&self, user: &User) -> Result<(), GatewayError> {
        let contents = format!(
            "{}\n{},{},{},{},{}\n",
            USER_HEADER,
            user.id,
            quote(&user.name),
            quote(user.phone_number.as_deref().unwrap_or_default()),
            quote(&user.delivery_address),
            quote(&user.avatar)
        );
        self.write(USER_FILE, &contents)
    }
}

fn skip_malformed<T>(record: Result<T, GatewayError>) -> Option<T> {
    match record {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(error = %e, "Skipping invalid record");
            None
        }
    }
}

fn malformed(line: usize, reason: impl Into<String>) -> GatewayError {
    GatewayError::MalformedRecord {
        line,
        reason: reason.into(),
    }
}

fn parse_product(line: usize, fields: Vec<String>) -> Result<Product, GatewayError> {
    let [id, name, description, price, stock_level] = fields.as_slice() else {
        return Err(malformed(line, format!("expected 5 fields, found {}", fields.len())));
    };

    let id = ProductId::from_str(id).map_err(|e| malformed(line, format!("id: {}", e)))?;
    let price = parse_amount(line, price)?;
    let stock_level = stock_level
        .trim()
        .parse::<u32>()
        .map_err(|e| malformed(line, format!("stock level: {}", e)))?;

    Ok(Product::new(id, name.as_str(), description.as_str(), price, stock_level))
}

fn parse_order(line: usize, fields: Vec<String>) -> Result<Order, GatewayError> {
    // Rows written before the status column existed are pending orders.
    let (id, units, total, status) = match fields.as_slice() {
        [id, units, total] => (id, units, total, OrderStatus::Pending),
        [id, units, total, status] => {
            let status = status.parse::<OrderStatus>().map_err(|reason: String| malformed(line, reason))?;
            (id, units, total, status)
        }
        _ => {
            return Err(malformed(line, format!("expected 3 or 4 fields, found {}", fields.len())));
        }
    };

    let id = OrderId::from_str(id).map_err(|e| malformed(line, format!("order id: {}", e)))?;
    let total = parse_amount(line, total)?;
    // Unparsable unit ids are dropped individually.
    let units = units
        .split(';')
        .filter(|unit| !unit.trim().is_empty())
        .filter_map(|unit| ProductId::from_str(unit).ok());

    let mut order = Order::from_units(id, units, total);
    order.status = status;
    Ok(order)
}

fn parse_user(line: usize, fields: Vec<String>) -> Result<User, GatewayError> {
    let [id, name, phone_number, delivery_address, avatar, ..] = fields.as_slice() else {
        return Err(malformed(line, format!("expected 5 fields, found {}", fields.len())));
    };

    let phone_number = phone_number.trim();
    Ok(User {
        id: id.trim().parse().unwrap_or(0),
        name: name.trim().to_string(),
        phone_number: (!phone_number.is_empty()).then(|| phone_number.to_string()),
        delivery_address: delivery_address.trim().to_string(),
        avatar: avatar.trim().to_string(),
    })
}

fn parse_amount(line: usize, raw: &str) -> Result<Decimal, GatewayError> {
    let amount = Decimal::from_str(raw.trim()).map_err(|e| malformed(line, format!("amount: {}", e)))?;
    if amount.is_sign_negative() {
        return Err(malformed(line, "negative amount"));
    }
    Ok(amount)
}

/// One CSV record: the line it starts on and its fields, or why it could
/// not be split.
type Record = (usize, Result<Vec<String>, GatewayError>);

/// Splits CSV text into records. Fields may be wrapped in double quotes, in
/// which case they can contain commas and line breaks, and `""` stands for a
/// literal quote. Blank lines yield no record.
fn split_records(contents: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut start = 1;
    let mut chars = contents.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            (',', false) => fields.push(std::mem::take(&mut field)),
            ('\r', false) if chars.peek() == Some(&'\n') => {}
            ('\n', false) => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, start, std::mem::take(&mut fields));
                line += 1;
                start = line;
            }
            ('\n', true) => {
                field.push('\n');
                line += 1;
            }
            (c, _) => field.push(c),
        }
    }

    if in_quotes {
        records.push((start, Err(malformed(start, "unterminated quoted field"))));
    } else if !fields.is_empty() || !field.is_empty() {
        fields.push(field);
        push_record(&mut records, start, fields);
    }
    records
}

fn push_record(records: &mut Vec<Record>, line: usize, fields: Vec<String>) {
    let blank = matches!(fields.as_slice(), [only] if only.trim().is_empty());
    if !blank {
        records.push((line, Ok(fields)));
    }
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
