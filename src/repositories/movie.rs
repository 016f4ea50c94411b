use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait, sea_query::Expr,
};

use crate::{
    entities::{actor, country, genre, movie, movie_actor, movie_country, movie_genre, review},
    error::{AppError, AppResult},
    models::{
        ActorRecord, MovieCard, MovieDetail, MoviePayload, MovieRecord, MovieStatus, MovieUpdate,
        ReviewView,
    },
    repositories::now_sec,
};

#[derive(Clone)]
pub struct MovieRepository {
    db: DatabaseConnection,
}

#[derive(Default)]
struct Links {
    genres: Vec<i32>,
    countries: Vec<i32>,
    actors: Vec<i32>,
}

impl MovieRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ---- CMS ------------------------------------------------------------------

    pub async fn list(&self) -> AppResult<Vec<MovieRecord>> {
        let movies = movie::Entity::find().order_by_asc(movie::Column::Id).all(&self.db).await?;
        let ids: Vec<i32> = movies.iter().map(|m| m.id).collect();
        let mut links = load_links(&self.db, &ids).await?;

        Ok(movies
            .into_iter()
            .map(|m| {
                let l = links.remove(&m.id).unwrap_or_default();
                record(m, l)
            })
            .collect())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<MovieRecord> {
        let movie = find(&self.db, id).await?;
        let mut links = load_links(&self.db, &[id]).await?;
        Ok(record(movie, links.remove(&id).unwrap_or_default()))
    }

    /// Inserts the movie and all of its associations in one transaction.
    pub async fn create(&self, payload: MoviePayload) -> AppResult<MovieRecord> {
        let links = Links {
            genres: dedup(payload.genres),
            countries: dedup(payload.countries),
            actors: dedup(payload.actors),
        };

        let txn = self.db.begin().await?;
        check_references(
            &txn,
            Some(links.genres.as_slice()),
            Some(links.countries.as_slice()),
            Some(links.actors.as_slice()),
        )
        .await?;

        let created = movie::ActiveModel {
            title: Set(payload.title.trim().to_string()),
            synopsis: Set(payload.synopsis.trim().to_string()),
            year: Set(payload.year),
            rating: Set(payload.rating),
            status: Set(payload.status),
            poster: Set(payload.poster.trim().to_string()),
            trailer: Set(payload.trailer.trim().to_string()),
            created_at: Set(now_sec()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        replace_links(
            &txn,
            created.id,
            Some(links.genres.as_slice()),
            Some(links.countries.as_slice()),
            Some(links.actors.as_slice()),
        )
        .await?;
        txn.commit().await?;

        tracing::debug!(
            id = created.id,
            title = %created.title,
            genres = links.genres.len(),
            countries = links.countries.len(),
            actors = links.actors.len(),
            "movie created"
        );
        Ok(record(created, links))
    }

    /// Applies the fields present in `changes`; association lists that are
    /// present replace the current set.
    pub async fn update(&self, id: i32, changes: MovieUpdate) -> AppResult<MovieRecord> {
        let genres = changes.genres.map(dedup);
        let countries = changes.countries.map(dedup);
        let actors = changes.actors.map(dedup);

        let txn = self.db.begin().await?;
        let current = find(&txn, id).await?;
        check_references(&txn, genres.as_deref(), countries.as_deref(), actors.as_deref()).await?;

        let mut model = current.into_active_model();
        if let Some(title) = changes.title {
            model.title = Set(title.trim().to_string());
        }
        if let Some(synopsis) = changes.synopsis {
            model.synopsis = Set(synopsis.trim().to_string());
        }
        if let Some(year) = changes.year {
            model.year = Set(year);
        }
        if let Some(rating) = changes.rating {
            model.rating = Set(rating);
        }
        if let Some(status) = changes.status {
            model.status = Set(status);
        }
        if let Some(poster) = changes.poster {
            model.poster = Set(poster.trim().to_string());
        }
        if let Some(trailer) = changes.trailer {
            model.trailer = Set(trailer.trim().to_string());
        }
        if model.is_changed() {
            model.update(&txn).await?;
        }

        replace_links(&txn, id, genres.as_deref(), countries.as_deref(), actors.as_deref()).await?;

        let updated = find(&txn, id).await?;
        let mut links = load_links(&txn, &[id]).await?;
        txn.commit().await?;

        Ok(record(updated, links.remove(&id).unwrap_or_default()))
    }

    /// Removes the movie, its associations and its reviews.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;
        find(&txn, id).await?;

        replace_links(&txn, id, Some(&[][..]), Some(&[][..]), Some(&[][..])).await?;
        review::Entity::delete_many().filter(review::Column::MovieId.eq(id)).exec(&txn).await?;
        movie::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        tracing::debug!(id, "movie deleted");
        Ok(())
    }

    // ---- landing --------------------------------------------------------------

    /// Most reviewed first, ties broken by rating.
    pub async fn popular(&self, limit: u64) -> AppResult<Vec<MovieCard>> {
        let movies = movie::Entity::find()
            .left_join(review::Entity)
            .group_by(movie::Column::Id)
            .order_by_desc(Expr::col((review::Entity, review::Column::Id)).count())
            .order_by_desc(movie::Column::Rating)
            .order_by_asc(movie::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        self.cards(movies).await
    }

    pub async fn top_rated(&self, limit: u64) -> AppResult<Vec<MovieCard>> {
        let movies = movie::Entity::find()
            .order_by_desc(movie::Column::Rating)
            .order_by_asc(movie::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        self.cards(movies).await
    }

    /// Movies flagged upcoming or dated after `current_year`, soonest first.
    pub async fn upcoming(&self, limit: u64, current_year: i32) -> AppResult<Vec<MovieCard>> {
        let movies = movie::Entity::find()
            .filter(
                Condition::any()
                    .add(movie::Column::Status.eq(MovieStatus::Upcoming))
                    .add(movie::Column::Year.gt(current_year)),
            )
            .order_by_asc(movie::Column::Year)
            .order_by_asc(movie::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        self.cards(movies).await
    }

    /// Highest rated movies that have a trailer to play.
    pub async fn top_movies(&self, limit: u64) -> AppResult<Vec<MovieCard>> {
        let movies = movie::Entity::find()
            .filter(movie::Column::Trailer.ne(""))
            .order_by_desc(movie::Column::Rating)
            .order_by_asc(movie::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        self.cards(movies).await
    }

    pub async fn detail(&self, id: i32) -> AppResult<MovieDetail> {
        let movie = find(&self.db, id).await?;

        let actors = movie
            .find_related(actor::Entity)
            .order_by_asc(actor::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(ActorRecord::from)
            .collect();

        let reviews = movie
            .find_related(review::Entity)
            .order_by_asc(review::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(ReviewView::from)
            .collect();

        let MovieCard { genres, countries, .. } =
            self.cards(vec![movie.clone()]).await?.pop().ok_or(AppError::NotFound("Movie"))?;

        Ok(MovieDetail {
            id: movie.id,
            title: movie.title,
            synopsis: movie.synopsis,
            poster: movie.poster,
            year: movie.year,
            rating: movie.rating,
            status: movie.status,
            trailer: movie.trailer,
            genres,
            countries,
            actors,
            reviews,
        })
    }

    async fn cards(&self, movies: Vec<movie::Model>) -> AppResult<Vec<MovieCard>> {
        if movies.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = movies.iter().map(|m| m.id).collect();

        let mut genre_names: HashMap<i32, Vec<String>> = HashMap::new();
        for (link, genre) in movie_genre::Entity::find()
            .filter(movie_genre::Column::MovieId.is_in(ids.clone()))
            .order_by_asc(movie_genre::Column::GenreId)
            .find_also_related(genre::Entity)
            .all(&self.db)
            .await?
        {
            if let Some(genre) = genre {
                genre_names.entry(link.movie_id).or_default().push(genre.name);
            }
        }

        let mut country_names: HashMap<i32, Vec<String>> = HashMap::new();
        for (link, country) in movie_country::Entity::find()
            .filter(movie_country::Column::MovieId.is_in(ids))
            .order_by_asc(movie_country::Column::CountryId)
            .find_also_related(country::Entity)
            .all(&self.db)
            .await?
        {
            if let Some(country) = country {
                country_names.entry(link.movie_id).or_default().push(country.name);
            }
        }

        Ok(movies
            .into_iter()
            .map(|m| MovieCard {
                genres: genre_names.remove(&m.id).unwrap_or_default(),
                countries: country_names.remove(&m.id).unwrap_or_default(),
                id: m.id,
                title: m.title,
                poster: m.poster,
                year: m.year,
                rating: m.rating,
                status: m.status,
                trailer: m.trailer,
            })
            .collect())
    }
}

async fn find<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<movie::Model> {
    movie::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound("Movie"))
}

fn record(m: movie::Model, links: Links) -> MovieRecord {
    MovieRecord {
        id: m.id,
        title: m.title,
        synopsis: m.synopsis,
        year: m.year,
        rating: m.rating,
        status: m.status,
        poster: m.poster,
        trailer: m.trailer,
        genres: links.genres,
        countries: links.countries,
        actors: links.actors,
    }
}

fn dedup(mut ids: Vec<i32>) -> Vec<i32> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

async fn load_links<C: ConnectionTrait>(db: &C, ids: &[i32]) -> AppResult<HashMap<i32, Links>> {
    let mut out: HashMap<i32, Links> = HashMap::new();
    if ids.is_empty() {
        return Ok(out);
    }

    for row in movie_genre::Entity::find()
        .filter(movie_genre::Column::MovieId.is_in(ids.to_vec()))
        .order_by_asc(movie_genre::Column::GenreId)
        .all(db)
        .await?
    {
        out.entry(row.movie_id).or_default().genres.push(row.genre_id);
    }
    for row in movie_country::Entity::find()
        .filter(movie_country::Column::MovieId.is_in(ids.to_vec()))
        .order_by_asc(movie_country::Column::CountryId)
        .all(db)
        .await?
    {
        out.entry(row.movie_id).or_default().countries.push(row.country_id);
    }
    for row in movie_actor::Entity::find()
        .filter(movie_actor::Column::MovieId.is_in(ids.to_vec()))
        .order_by_asc(movie_actor::Column::ActorId)
        .all(db)
        .await?
    {
        out.entry(row.movie_id).or_default().actors.push(row.actor_id);
    }

    Ok(out)
}

async fn check_references<C: ConnectionTrait>(
    db: &C,
    genres: Option<&[i32]>,
    countries: Option<&[i32]>,
    actors: Option<&[i32]>,
) -> AppResult<()> {
    if let Some(ids) = genres.filter(|ids| !ids.is_empty()) {
        let found = genre::Entity::find()
            .filter(genre::Column::Id.is_in(ids.to_vec()))
            .count(db)
            .await?;
        require_all("genres", ids, found)?;
    }
    if let Some(ids) = countries.filter(|ids| !ids.is_empty()) {
        let found = country::Entity::find()
            .filter(country::Column::Id.is_in(ids.to_vec()))
            .count(db)
            .await?;
        require_all("countries", ids, found)?;
    }
    if let Some(ids) = actors.filter(|ids| !ids.is_empty()) {
        let found = actor::Entity::find()
            .filter(actor::Column::Id.is_in(ids.to_vec()))
            .count(db)
            .await?;
        require_all("actors", ids, found)?;
    }
    Ok(())
}

fn require_all(field: &str, ids: &[i32], found: u64) -> AppResult<()> {
    if found != ids.len() as u64 {
        return Err(AppError::invalid_field(field, "references an unknown id"));
    }
    Ok(())
}

async fn replace_links<C: ConnectionTrait>(
    db: &C,
    movie_id: i32,
    genres: Option<&[i32]>,
    countries: Option<&[i32]>,
    actors: Option<&[i32]>,
) -> AppResult<()> {
    if let Some(ids) = genres {
        movie_genre::Entity::delete_many()
            .filter(movie_genre::Column::MovieId.eq(movie_id))
            .exec(db)
            .await?;
        if !ids.is_empty() {
            movie_genre::Entity::insert_many(ids.iter().map(|&genre_id| movie_genre::ActiveModel {
                movie_id: Set(movie_id),
                genre_id: Set(genre_id),
            }))
            .exec_without_returning(db)
            .await?;
        }
    }
    if let Some(ids) = countries {
        movie_country::Entity::delete_many()
            .filter(movie_country::Column::MovieId.eq(movie_id))
            .exec(db)
            .await?;
        if !ids.is_empty() {
            movie_country::Entity::insert_many(ids.iter().map(|&country_id| {
                movie_country::ActiveModel { movie_id: Set(movie_id), country_id: Set(country_id) }
            }))
            .exec_without_returning(db)
            .await?;
        }
    }
    if let Some(ids) = actors {
        movie_actor::Entity::delete_many()
            .filter(movie_actor::Column::MovieId.eq(movie_id))
            .exec(db)
            .await?;
        if !ids.is_empty() {
            movie_actor::Entity::insert_many(ids.iter().map(|&actor_id| movie_actor::ActiveModel {
                movie_id: Set(movie_id),
                actor_id: Set(actor_id),
            }))
            .exec_without_returning(db)
            .await?;
        }
    }
    Ok(())
}
