use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS media_gateway;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO media_gateway, public;")
            .await?;

        // Grant the service's DB role access to everything created in the schema
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    GRANT ALL ON SCHEMA media_gateway TO media_gateway;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA media_gateway GRANT ALL ON TABLES TO media_gateway;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA media_gateway GRANT ALL ON SEQUENCES TO media_gateway;
                END $$;
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA media_gateway REVOKE ALL ON SEQUENCES FROM media_gateway;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA media_gateway REVOKE ALL ON TABLES FROM media_gateway;
                    REVOKE ALL ON SCHEMA media_gateway FROM media_gateway;
                END $$;
            "#)
            .await?;

        // CASCADE removes every object in the schema
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS media_gateway CASCADE;")
            .await?;

        Ok(())
    }
}
