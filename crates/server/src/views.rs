//! Conversions from engine types to wire views.
//!
//! Views always carry both the raw cents and a preformatted display string,
//! so clients never do currency math themselves.

use api_types::{catalog::DrinkTypeView, drink::DrinkReceiptView, postpaid::PostpaidView,
    prepaid::PrepaidView};
use engine::{AccountKind, DrinkReceipt, DrinkType, PostpaidUser, PrepaidUser};

pub(crate) fn account_kind(kind: AccountKind) -> api_types::AccountKind {
    match kind {
        AccountKind::Postpaid => api_types::AccountKind::Postpaid,
        AccountKind::Prepaid => api_types::AccountKind::Prepaid,
    }
}

pub(crate) fn postpaid(user: PostpaidUser) -> PostpaidView {
    PostpaidView {
        id: user.id,
        username: user.username,
        money_cents: user.money.cents(),
        money: user.money.to_string(),
        activated: user.activated,
        last_drink: user.last_drink,
    }
}

pub(crate) fn prepaid(user: PrepaidUser) -> PrepaidView {
    PrepaidView {
        id: user.id,
        username: user.username,
        user_key: user.user_key,
        money_cents: user.money.cents(),
        money: user.money.to_string(),
        activated: user.activated,
        last_drink: user.last_drink,
    }
}

pub(crate) fn drink_type(entry: DrinkType) -> DrinkTypeView {
    DrinkTypeView {
        id: entry.id,
        name: entry.name,
        icon: entry.icon,
        quantity: entry.quantity,
        consumed: entry.consumed,
    }
}

pub(crate) fn receipt(receipt: DrinkReceipt) -> DrinkReceiptView {
    DrinkReceiptView {
        account: account_kind(receipt.kind),
        username: receipt.username,
        money_cents: receipt.money.cents(),
        money: receipt.money.to_string(),
        last_drink: receipt.last_drink,
    }
}
