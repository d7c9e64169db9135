use fieldmap::{
    BoxError, Column, MapDecode, MapEncode, Reason, Record, Value, fill_struct_by_tags, map_tags, mapped,
};

/// Amount in cents, written as `"12.34"` text.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Money(i64);

impl MapEncode for Money {
    fn map_encode(&self) -> Result<Value, BoxError> {
        Ok(Value::Str(format!("{}.{:02}", self.0 / 100, self.0 % 100)))
    }
}

impl MapDecode for Money {
    fn map_decode(&mut self, value: Value) -> Result<(), BoxError> {
        match value {
            Value::Str(text) => {
                let (units, cents) = text.split_once('.').ok_or("money needs a decimal point")?;
                self.0 = units.parse::<i64>()? * 100 + cents.parse::<i64>()?;
                Ok(())
            }
            Value::I64(cents) => {
                self.0 = cents;
                Ok(())
            }
            other => Err(format!("cannot read money from {}", other.type_name()).into()),
        }
    }
}

impl Column for Money {
    fn scan(&mut self, src: Value) -> Result<(), BoxError> {
        self.map_decode(src)
    }

    fn read(&self) -> Result<Value, BoxError> {
        Ok(Value::I64(self.0))
    }
}

fieldmap::custom_field!(Money, column);

#[derive(Record, Debug, Default, Clone, PartialEq)]
#[record(encode, decode)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl MapEncode for Point {
    fn map_encode(&self) -> Result<Value, BoxError> {
        if self.x < 0 {
            return Err("negative coordinates".into());
        }
        Ok(Value::Str(format!("{},{}", self.x, self.y)))
    }
}

impl MapDecode for Point {
    fn map_decode(&mut self, value: Value) -> Result<(), BoxError> {
        let Value::Str(text) = value else {
            return Err("point must be text".into());
        };
        let (x, y) = text.split_once(',').ok_or("point needs two coordinates")?;
        self.x = x.trim().parse()?;
        self.y = y.trim().parse()?;
        Ok(())
    }
}

#[derive(Record, Debug, Default, Clone, PartialEq)]
pub struct Invoice {
    #[tag(json = "price")]
    pub price: Money,
    #[tag(json = "discount")]
    pub discount: Option<Money>,
    #[tag(json = "at")]
    pub at: Point,
}

#[test]
fn encode_hooks_replace_default_extraction() {
    let invoice = Invoice {
        price: Money(1234),
        discount: Some(Money(5)),
        at: Point { x: 1, y: 2 },
    };
    let m = map_tags(&invoice, "json");
    assert_eq!(m["price"], Value::Str("12.34".into()));
    assert_eq!(m["discount"], Value::Str("0.05".into()));
    assert_eq!(m["at"], Value::Str("1,2".into()));
}

#[test]
fn failing_encode_hook_emits_nil() {
    let invoice = Invoice {
        at: Point { x: -1, y: 0 },
        ..Invoice::default()
    };
    assert_eq!(map_tags(&invoice, "json")["at"], Value::Null);
}

#[test]
fn decode_hooks_absorb_raw_values() {
    let mut invoice = Invoice::default();
    let m = mapped! { "price" => "3.50", "discount" => 20_i64, "at" => "4, 5" };
    fill_struct_by_tags(&mut invoice, &m, "json").unwrap();
    assert_eq!(invoice.price, Money(350));
    assert_eq!(invoice.discount, Some(Money(20)));
    assert_eq!(invoice.at, Point { x: 4, y: 5 });
}

#[test]
fn decode_hook_error_is_verbatim() {
    let mut invoice = Invoice::default();
    let err = fill_struct_by_tags(&mut invoice, &mapped! { "price" => "350" }, "json").unwrap_err();
    let reason = &err.errors()[0].reason;
    assert!(matches!(reason, Reason::Hook(_)));
    assert_eq!(reason.to_string(), "money needs a decimal point");
    assert_eq!(invoice.price, Money::default());
}

#[test]
fn hook_round_trip() {
    let invoice = Invoice {
        price: Money(99),
        discount: None,
        at: Point { x: 7, y: 8 },
    };
    let mut restored = Invoice::default();
    fill_struct_by_tags(&mut restored, &map_tags(&invoice, "json"), "json").unwrap();
    assert_eq!(restored, invoice);
}
