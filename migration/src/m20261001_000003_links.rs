//! 推广链接、按天统计和排行榜表

use sea_orm_migration::prelude::*;

use crate::m20261001_000001_accounts::User;
use crate::m20261001_000002_banners::Banner;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Link::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Link::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Link::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Link::BannerId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Link::BannerVariationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Link::Html).text().not_null())
                    .col(
                        ColumnDef::new(Link::AggregateLinkClicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Link::AggregateFirefoxDownloads)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Link::Created)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Link::Modified)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_links_user")
                            .from(Link::Table, Link::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_links_banner")
                            .from(Link::Table, Link::BannerId)
                            .to(Banner::Table, Banner::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_user")
                    .table(Link::Table)
                    .col(Link::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DataPoint::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DataPoint::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DataPoint::LinkId).big_integer().not_null())
                    .col(ColumnDef::new(DataPoint::Date).date().not_null())
                    .col(
                        ColumnDef::new(DataPoint::LinkClicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DataPoint::FirefoxDownloads)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_data_points_link")
                            .from(DataPoint::Table, DataPoint::LinkId)
                            .to(Link::Table, Link::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一索引：link_id + date（upsert 依赖）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_data_points_link_date")
                    .table(DataPoint::Table)
                    .col(DataPoint::LinkId)
                    .col(DataPoint::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_data_points_date")
                    .table(DataPoint::Table)
                    .col(DataPoint::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LeaderboardStanding::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeaderboardStanding::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LeaderboardStanding::Ranking)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeaderboardStanding::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeaderboardStanding::Metric)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeaderboardStanding::Value)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_leaderboard_metric_ranking")
                    .table(LeaderboardStanding::Table)
                    .col(LeaderboardStanding::Metric)
                    .col(LeaderboardStanding::Ranking)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LeaderboardStanding::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DataPoint::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Link::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Link {
    #[sea_orm(iden = "links")]
    Table,
    Id,
    UserId,
    BannerId,
    BannerVariationId,
    Html,
    AggregateLinkClicks,
    AggregateFirefoxDownloads,
    Created,
    Modified,
}

#[derive(DeriveIden)]
enum DataPoint {
    #[sea_orm(iden = "data_points")]
    Table,
    Id,
    LinkId,
    Date,
    LinkClicks,
    FirefoxDownloads,
}

#[derive(DeriveIden)]
enum LeaderboardStanding {
    #[sea_orm(iden = "leaderboard_standings")]
    Table,
    Id,
    Ranking,
    UserId,
    Metric,
    Value,
}
