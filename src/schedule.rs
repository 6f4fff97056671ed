//! Campaign scheduling: when each post of a campaign goes out, and the
//! generation run that fills a campaign with posts.

use std::num::NonZeroUsize;

use chrono::{DateTime, Duration, Utc};
use futures::{StreamExt, TryStreamExt};
use uuid::Uuid;

use crate::{
	generate::{self, Gateway},
	route::{
		campaign::model::{Campaign, CampaignStatus, CreateCampaignInput, Frequency, MAX_POSTS},
		post::model::{Post, DEFAULT_TONE},
	},
	store::Collection,
};

/// Hour of the day of the first post of every day.
const FIRST_HOUR: u32 = 8;
/// Length of the daily publishing window, in hours.
const WINDOW_HOURS: u32 = 12;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("a campaign needs between 1 and {MAX_POSTS} posts, not {0}")]
	PostsCount(u32),
	#[error("a campaign needs a name")]
	Name,
	#[error("generation failed: {0}")]
	Generation(#[from] generate::Error),
}

/// The scheduled time of the post at `index` (zero-based).
///
/// Posts fill the days one after another, `posts_per_day` at a time, spaced
/// evenly through the window that opens at 08:00 relative to `start`.
pub fn slot(start: DateTime<Utc>, frequency: Frequency, index: u32) -> DateTime<Utc> {
	let per_day = frequency.posts_per_day();
	let day = index / per_day;
	let hour = FIRST_HOUR + (index % per_day) * (WINDOW_HOURS / per_day);

	start + Duration::days(i64::from(day)) + Duration::hours(i64::from(hour))
}

/// Every slot of a campaign, in order.
pub fn slots(start: DateTime<Utc>, frequency: Frequency) -> impl Iterator<Item = DateTime<Utc>> {
	(0..).map(move |index| slot(start, frequency, index))
}

/// Generates every post of a new campaign and stores the campaign.
///
/// Input is checked before any provider call. Text for all posts is generated
/// first, then one image per post, both in post order with at most
/// `concurrency` calls in flight. Any failure aborts the whole run and
/// nothing is stored.
#[tracing::instrument(skip_all, fields(campaign = %input.name, posts = input.posts_count))]
pub async fn create_campaign(
	gateway: &dyn Gateway,
	campaigns: &Collection<Campaign>,
	concurrency: NonZeroUsize,
	input: CreateCampaignInput,
) -> Result<Campaign, Error> {
	if !(1..=MAX_POSTS).contains(&input.posts_count) {
		return Err(Error::PostsCount(input.posts_count));
	}

	if input.name.trim().is_empty() {
		return Err(Error::Name);
	}

	let contents = gateway
		.generate_campaign_posts(
			input.template_type,
			input.posts_count,
			DEFAULT_TONE,
			concurrency,
		)
		.await?;

	let images = futures::stream::iter(
		contents
			.iter()
			.map(|content| gateway.generate_image(&content.image_prompt, None))
			.collect::<Vec<_>>(),
	)
		.buffered(concurrency.get())
		.try_collect::<Vec<_>>()
		.await?;

	let posts = contents
		.into_iter()
		.zip(images)
		.zip(slots(input.start_date, input.frequency))
		.map(|((content, image_url), scheduled_at)| {
			Post::new(input.template_type, content, image_url, Some(scheduled_at))
		})
		.collect::<Vec<_>>();

	let campaign = Campaign {
		id: Uuid::new_v4(),
		name: input.name,
		template_type: input.template_type,
		posts,
		frequency: input.frequency,
		start_date: input.start_date,
		end_date: input.end_date,
		status: CampaignStatus::Active,
		created_at: Utc::now(),
	};

	campaigns.put(campaign.clone());

	tracing::info!(
		monotonic_counter.campaigns_created = 1_u64,
		id = %campaign.id,
		"campaign created"
	);

	Ok(campaign)
}

#[cfg(test)]
mod test {
	use std::sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	};

	use async_trait::async_trait;
	use chrono::{TimeZone, Timelike};

	use super::*;
	use crate::{
		generate::{GeneratedContent, Generator},
		route::{post::model::PostStatus, template::model::TemplateType},
		test::FakeText,
	};

	fn at(day: u32, hour: u32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
	}

	fn input(name: &str, frequency: Frequency, posts_count: u32) -> CreateCampaignInput {
		CreateCampaignInput {
			name: name.into(),
			template_type: TemplateType::BookBlog,
			frequency,
			start_date: at(1, 0),
			end_date: None,
			posts_count,
		}
	}

	/// A gateway whose image call fails hard on one call.
	struct BrokenImages {
		fail_at: usize,
		text_calls: AtomicUsize,
		image_calls: AtomicUsize,
	}

	impl BrokenImages {
		fn new(fail_at: usize) -> Self {
			Self {
				fail_at,
				text_calls: AtomicUsize::new(0),
				image_calls: AtomicUsize::new(0),
			}
		}
	}

	#[async_trait]
	impl Gateway for BrokenImages {
		async fn generate_caption(
			&self,
			_: TemplateType,
			_: Option<&str>,
			_: &str,
		) -> Result<GeneratedContent, generate::Error> {
			self.text_calls.fetch_add(1, Ordering::SeqCst);

			Ok(GeneratedContent {
				caption: "caption".into(),
				hashtags: vec!["books".into()],
				image_prompt: "a shelf".into(),
			})
		}

		async fn generate_image(
			&self,
			_: &str,
			_: Option<&str>,
		) -> Result<String, generate::Error> {
			if self.image_calls.fetch_add(1, Ordering::SeqCst) == self.fail_at {
				return Err(generate::Error::Provider("quota exceeded".into()));
			}

			Ok("https://images.test/1.png".into())
		}
	}

	#[test]
	fn test_twice_daily_schedule() {
		let times = slots(at(1, 0), Frequency::TwiceDaily).take(3).collect::<Vec<_>>();

		assert_eq!(times, [at(1, 8), at(1, 14), at(2, 8)]);
	}

	#[test]
	fn test_three_times_daily_schedule() {
		let times = slots(at(1, 0), Frequency::ThreeTimesDaily).take(4).collect::<Vec<_>>();

		assert_eq!(times, [at(1, 8), at(1, 12), at(1, 16), at(2, 8)]);
	}

	#[test]
	fn test_daily_schedule() {
		assert_eq!(slot(at(1, 0), Frequency::Daily, 0), at(1, 8));
		assert_eq!(slot(at(1, 0), Frequency::Daily, 29), at(30, 8));
	}

	#[test]
	fn test_slots_strictly_increase_within_window() {
		for frequency in [
			Frequency::Daily,
			Frequency::TwiceDaily,
			Frequency::ThreeTimesDaily,
		] {
			let times = slots(at(1, 0), frequency)
				.take(MAX_POSTS as usize)
				.collect::<Vec<_>>();

			assert!(times.windows(2).all(|pair| pair[0] < pair[1]));
			assert!(times.iter().all(|time| (8..20).contains(&time.hour())));

			let per_day = frequency.posts_per_day() as usize;

			for day in times.chunks(per_day) {
				assert_eq!(day[0].hour(), 8);

				let gaps = day
					.windows(2)
					.map(|pair| pair[1] - pair[0])
					.collect::<Vec<_>>();

				assert!(gaps.windows(2).all(|pair| pair[0] == pair[1]));
			}
		}
	}

	#[tokio::test]
	async fn test_create_campaign() {
		let text = FakeText::echoing();
		let calls = text.calls();
		let gateway = Generator::new(Arc::new(text), None);
		let campaigns = Collection::default();

		let campaign = create_campaign(
			&gateway,
			&campaigns,
			NonZeroUsize::new(2).unwrap(),
			input("Spring reads", Frequency::TwiceDaily, 3),
		)
		.await
		.unwrap();

		assert_eq!(calls.load(Ordering::SeqCst), 3);
		assert_eq!(campaign.status, CampaignStatus::Active);
		assert_eq!(campaign.posts.len(), 3);
		assert!(campaign
			.posts
			.iter()
			.all(|post| post.status == PostStatus::Scheduled));
		assert_eq!(
			campaign
				.posts
				.iter()
				.map(|post| post.scheduled_at)
				.collect::<Vec<_>>(),
			[Some(at(1, 8)), Some(at(1, 14)), Some(at(2, 8))]
		);
		assert_eq!(campaign.posts[1].caption, "variation 2 of 3");
		assert_eq!(campaigns.list().len(), 1);
	}

	#[tokio::test]
	async fn test_invalid_input_makes_no_calls() {
		let gateway = BrokenImages::new(usize::MAX);
		let campaigns = Collection::default();

		for (name, count) in [("Empty", 0), ("Too many", MAX_POSTS + 1), ("  ", 3)] {
			let result = create_campaign(
				&gateway,
				&campaigns,
				NonZeroUsize::MIN,
				input(name, Frequency::Daily, count),
			)
			.await;

			assert!(matches!(result, Err(Error::PostsCount(..) | Error::Name)));
		}

		assert_eq!(gateway.text_calls.load(Ordering::SeqCst), 0);
		assert_eq!(gateway.image_calls.load(Ordering::SeqCst), 0);
		assert!(campaigns.list().is_empty());
	}

	#[tokio::test]
	async fn test_image_failure_stores_nothing() {
		let count = 6;
		let gateway = BrokenImages::new(count / 2);
		let campaigns = Collection::default();

		let result = create_campaign(
			&gateway,
			&campaigns,
			NonZeroUsize::MIN,
			input("Doomed", Frequency::ThreeTimesDaily, count as u32),
		)
		.await;

		assert!(matches!(result, Err(Error::Generation(..))));
		assert_eq!(gateway.text_calls.load(Ordering::SeqCst), count);
		assert_eq!(gateway.image_calls.load(Ordering::SeqCst), count / 2 + 1);
		assert!(!campaigns
			.list()
			.iter()
			.any(|campaign| campaign.name == "Doomed"));
	}
}
