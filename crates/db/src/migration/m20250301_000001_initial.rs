//! Initial schema: users, wallets, transactions.

use sea_orm_migration::prelude::*;
use tally_shared::types::money_sql_type;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(&wallets_sql()).await?;
        db.execute_unprepared(&transactions_sql()).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS transactions CASCADE;
             DROP TABLE IF EXISTS wallets CASCADE;
             DROP TABLE IF EXISTS users CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    external_subject VARCHAR(255) NOT NULL UNIQUE,
    email VARCHAR(320) NOT NULL UNIQUE,
    display_name VARCHAR(255) NOT NULL,
    avatar_url TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

/// Money columns share one type with input validation.
fn wallets_sql() -> String {
    let money = money_sql_type();
    format!(
        r"
CREATE TABLE wallets (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    account_number VARCHAR(64) NOT NULL,
    initial_balance {money} NOT NULL DEFAULT 0,
    balance {money} NOT NULL DEFAULT 0,
    currency CHAR(3) NOT NULL DEFAULT 'VND',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_wallets_owner_account UNIQUE (owner_id, account_number),
    CONSTRAINT chk_wallets_initial_balance CHECK (initial_balance >= 0),
    CONSTRAINT chk_wallets_balance CHECK (balance >= 0),
    CONSTRAINT chk_wallets_currency CHECK (currency ~ '^[A-Z]{{3}}$')
);

-- Wallet list is ordered by creation
CREATE INDEX idx_wallets_owner ON wallets(owner_id, created_at);
"
    )
}

fn transactions_sql() -> String {
    let money = money_sql_type();
    format!(
        r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    wallet_id UUID NOT NULL REFERENCES wallets(id) ON DELETE CASCADE,
    kind VARCHAR(16) NOT NULL,
    amount {money} NOT NULL,
    category VARCHAR(255) NOT NULL,
    note TEXT,
    occurred_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_transactions_kind CHECK (kind IN ('income', 'expense')),
    CONSTRAINT chk_transactions_amount CHECK (amount > 0)
);

-- Listing and summing by owner over time
CREATE INDEX idx_transactions_owner_occurred ON transactions(owner_id, occurred_at DESC);

-- Same, restricted to one wallet
CREATE INDEX idx_transactions_wallet_occurred ON transactions(wallet_id, occurred_at DESC);
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{transactions, wallets};
    use sea_orm::{ColumnTrait, sea_query::ColumnType};
    use tally_shared::types::{MONEY_PRECISION, MONEY_SCALE};

    #[test]
    fn test_money_columns_use_shared_type() {
        let wallets = wallets_sql();
        assert!(wallets.contains("initial_balance NUMERIC(19, 4)"));
        assert!(wallets.contains("balance NUMERIC(19, 4)"));
        assert!(wallets.contains("'^[A-Z]{3}$'"));
        assert!(transactions_sql().contains("amount NUMERIC(19, 4)"));
    }

    #[test]
    fn test_entities_match_money_domain() {
        let expected = ColumnType::Decimal(Some((MONEY_PRECISION, MONEY_SCALE)));
        for column_type in [
            transactions::Column::Amount.def().get_column_type().clone(),
            wallets::Column::Balance.def().get_column_type().clone(),
            wallets::Column::InitialBalance.def().get_column_type().clone(),
        ] {
            assert_eq!(column_type, expected);
        }
    }
}
